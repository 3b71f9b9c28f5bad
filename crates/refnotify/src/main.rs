mod config;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::{debug, info};

use config::FileConfig;
use refnotify_core::{parse_updates, NotifierConfig, RefUpdate, RefUpdateNotifier};
use refnotify_git::GitRepo;
use refnotify_logging::LogFormat;
use refnotify_mail::{SendmailSink, Sink, StdoutSink};

#[derive(Parser, Debug)]
#[command(
    name = "git-refnotify",
    about = "Send push notifications for updated git refs",
    version,
    author
)]
struct Cli {
    /// Single update as `<ref> <old> <new>` (update hook); reads `<old> <new> <ref>` lines from stdin when omitted
    #[arg(value_names = ["REF", "OLD", "NEW"], num_args = 0..=3)]
    update: Vec<String>,

    /// Mail recipient (repeatable); notifications go to stdout when none is set
    #[arg(short, long = "mail", value_name = "ADDR")]
    mail: Vec<String>,

    /// Print notifications to stdout even when recipients are configured
    #[arg(long)]
    stdout: bool,

    /// Subject prefix (default: GIT)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Maximum body size in bytes before diffs are dropped, 0 for no limit (default: 10000)
    #[arg(short = 's', long, value_name = "BYTES")]
    max_diff_size: Option<usize>,

    /// Repository name (default: derived from the git dir)
    #[arg(short, long)]
    repo_name: Option<String>,

    /// Sender address
    #[arg(short, long, value_name = "ADDR")]
    from: Option<String>,

    /// Base gitweb URL for commit links
    #[arg(short = 'u', long, value_name = "URL")]
    gitweb_url: Option<String>,

    /// Branch to leave out of notifications (repeatable)
    #[arg(short = 'x', long = "exclude", value_name = "BRANCH")]
    exclude: Vec<String>,

    /// Number of commits in "most recent commits" listings (default: 20)
    #[arg(long, value_name = "N")]
    recent: Option<usize>,

    /// Path to the sendmail program (default: /usr/sbin/sendmail)
    #[arg(long, value_name = "PATH")]
    sendmail: Option<PathBuf>,

    /// Repository location (default: current directory)
    #[arg(short = 'd', long, value_name = "PATH")]
    git_dir: Option<PathBuf>,

    /// Config file (default: refnotify.toml in the git dir, if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.update.len(), 0 | 3) {
        Cli::command()
            .error(
                ErrorKind::WrongNumberOfValues,
                "expected either <REF> <OLD> <NEW> or no positional arguments",
            )
            .exit();
    }

    refnotify_logging::init_tracing(&cli.log_level, cli.log_format.into());

    let git_dir = cli.git_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = GitRepo::discover(&git_dir)
        .with_context(|| format!("Failed to open repository at {}", git_dir.display()))?;

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::discover(repo.git_dir())?.unwrap_or_default(),
    };

    let updates = read_updates(&cli)?;
    if updates.is_empty() {
        debug!("No ref updates to report");
        return Ok(());
    }

    let notifier_config = notifier_config(&cli, &file, repo.default_name());
    let notifier = RefUpdateNotifier::new(&repo, &notifier_config);
    let messages = notifier.notify_all(&updates)?;

    let mut sink = build_sink(&cli, file)?;
    for message in &messages {
        sink.deliver(message)
            .with_context(|| format!("Failed to deliver \"{}\"", message.subject))?;
    }

    info!(updates = updates.len(), sent = messages.len(), "Done");

    Ok(())
}

fn read_updates(cli: &Cli) -> Result<Vec<RefUpdate>> {
    if let [refname, old, new] = cli.update.as_slice() {
        return Ok(RefUpdate::new(old, new, refname)?.into_iter().collect());
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read ref updates from stdin")?;
    Ok(parse_updates(&input)?)
}

/// Command line beats config file beats built-in defaults
fn notifier_config(cli: &Cli, file: &FileConfig, default_name: String) -> NotifierConfig {
    let repo_name = cli
        .repo_name
        .clone()
        .or_else(|| file.repo_name.clone())
        .unwrap_or(default_name);

    let mut config = NotifierConfig::new(repo_name);
    if let Some(prefix) = cli.prefix.as_ref().or(file.prefix.as_ref()) {
        config = config.with_subject_prefix(prefix.as_str());
    }
    if let Some(size) = cli.max_diff_size.or(file.max_diff_size) {
        config = config.with_max_diff_size(size);
    }
    if let Some(count) = cli.recent.or(file.recent_commits) {
        config = config.with_recent_commits(count);
    }
    if let Some(url) = cli.gitweb_url.as_ref().or(file.gitweb_url.as_ref()) {
        config = config.with_gitweb_url(url.as_str());
    }

    let excluded = if cli.exclude.is_empty() {
        &file.exclude_branches
    } else {
        &cli.exclude
    };
    for branch in excluded {
        config = config.with_excluded_branch(branch.as_str());
    }

    config
}

fn build_sink(cli: &Cli, file: FileConfig) -> Result<Box<dyn Sink>> {
    let recipients = if cli.mail.is_empty() {
        file.recipients
    } else {
        cli.mail.clone()
    };

    if cli.stdout || recipients.is_empty() {
        return Ok(Box::new(StdoutSink::stdout()));
    }

    let mut sink = SendmailSink::new(recipients)?;
    if let Some(program) = cli.sendmail.clone().or(file.sendmail) {
        sink = sink.with_program(program);
    }
    if let Some(from) = cli.from.clone().or(file.from) {
        sink = sink.with_from(from);
    }
    Ok(Box::new(sink))
}
