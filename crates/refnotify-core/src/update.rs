use refnotify_git::ObjectId;
use std::fmt;
use tracing::debug;

use crate::NotifyError;

const BRANCH_PREFIX: &str = "refs/heads/";
const TAG_PREFIX: &str = "refs/tags/";

/// Namespace of an updated ref
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Branch,
    Tag,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Branch => write!(f, "branch"),
            RefKind::Tag => write!(f, "tag"),
        }
    }
}

/// One pushed ref: `old` and `new` may be the zero id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefUpdate {
    pub refname: String,
    pub kind: RefKind,
    pub old: ObjectId,
    pub new: ObjectId,
}

impl RefUpdate {
    /// Build an update from raw hook input.
    ///
    /// Returns `Ok(None)` for refs outside `refs/heads/` and `refs/tags/`.
    pub fn new(old: &str, new: &str, refname: &str) -> Result<Option<Self>, NotifyError> {
        let old = parse_id(old)?;
        let new = parse_id(new)?;

        let kind = if refname.starts_with(BRANCH_PREFIX) {
            RefKind::Branch
        } else if refname.starts_with(TAG_PREFIX) {
            RefKind::Tag
        } else {
            debug!(refname, "Ignoring ref outside branch and tag namespaces");
            return Ok(None);
        };

        if refname.len() == prefix_len(kind) {
            return Err(NotifyError::ParseError(format!("empty ref name: {refname}")));
        }

        Ok(Some(Self {
            refname: refname.to_string(),
            kind,
            old,
            new,
        }))
    }

    /// Ref name without its `refs/heads/` or `refs/tags/` prefix
    pub fn short_name(&self) -> &str {
        &self.refname[prefix_len(self.kind)..]
    }

    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    pub fn is_create(&self) -> bool {
        self.old.is_zero()
    }

    pub fn is_delete(&self) -> bool {
        self.new.is_zero()
    }
}

fn prefix_len(kind: RefKind) -> usize {
    match kind {
        RefKind::Branch => BRANCH_PREFIX.len(),
        RefKind::Tag => TAG_PREFIX.len(),
    }
}

fn parse_id(s: &str) -> Result<ObjectId, NotifyError> {
    ObjectId::parse(s).map_err(|_| NotifyError::ParseError(format!("invalid object id {s:?}")))
}

/// Parse post-receive input: whitespace-separated `old new ref` triples.
///
/// Updates to ignored namespaces are dropped; a trailing incomplete triple is an error.
pub fn parse_updates(input: &str) -> Result<Vec<RefUpdate>, NotifyError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let chunks = tokens.chunks_exact(3);

    if !chunks.remainder().is_empty() {
        return Err(NotifyError::ParseError(format!(
            "expected <old> <new> <ref> triples, got {} trailing field(s)",
            chunks.remainder().len()
        )));
    }

    let mut updates = Vec::new();
    for triple in chunks {
        if let Some(update) = RefUpdate::new(triple[0], triple[1], triple[2])? {
            updates.push(update);
        }
    }

    debug!(count = updates.len(), "Parsed ref updates");

    Ok(updates)
}
