//! The `git-cc` command line.
//!
//! Parses the message given on the command line, checks it against the
//! configured conventions, and hands a valid message to `git commit`. Invalid
//! messages are reported field by field instead of being committed.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{self, Command};
use std::sync::Once;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::Shell;
use miette::{Diagnostic, Report};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;
use tracing::debug;

use crate::commit::CommitMessage;
use crate::config::{Config, ConfigError, DEFAULT_FILE};

/// The file git keeps the last commit message in, inside the git directory.
const COMMIT_MESSAGE_FILE: &str = "COMMIT_EDITMSG";

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "git-cc", version, about = "Write conventional commits.")]
pub struct GitCcArgs {
    /// The commit message, as bare words.
    pub words: Vec<String>,

    /// A message paragraph. Repeat to add paragraphs, like `git commit -m`.
    #[arg(short, long = "message", value_name = "MSG")]
    pub messages: Vec<String>,

    /// Use this config file instead of searching for one.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the message and the git command instead of committing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the parsed message as JSON instead of committing.
    #[arg(long)]
    pub json: bool,

    /// Reuse the message of the last commit attempt.
    #[arg(long, conflicts_with = "messages")]
    pub redo: bool,

    /// Print which config files were searched and which one is used.
    #[arg(long)]
    pub show_config: bool,

    /// Write a default config file to the repository root.
    #[arg(long)]
    pub init: bool,

    /// File extension of the config file written by --init.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t, requires = "init")]
    pub config_format: ConfigFormat,

    /// Print a completion script for SHELL and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    pub generate_shell_completion: Option<Shell>,

    /// Print a man page and exit.
    #[arg(long)]
    pub generate_man_page: bool,

    /// Passed to git commit.
    #[arg(short, long)]
    pub all: bool,

    /// Passed to git commit.
    #[arg(short, long, conflicts_with = "no_signoff")]
    pub signoff: bool,

    /// Passed to git commit.
    #[arg(long)]
    pub no_signoff: bool,

    /// Passed to git commit.
    #[arg(short = 'n', long, conflicts_with = "verify")]
    pub no_verify: bool,

    /// Passed to git commit.
    #[arg(long)]
    pub verify: bool,

    /// Passed to git commit.
    #[arg(long)]
    pub no_gpg_sign: bool,

    /// Passed to git commit.
    #[arg(long)]
    pub no_post_rewrite: bool,

    /// Passed to git commit.
    #[arg(long)]
    pub allow_empty: bool,

    /// Commit without opening an editor.
    #[arg(long)]
    pub no_edit: bool,

    /// Passed to git commit.
    #[arg(long, value_name = "AUTHOR")]
    pub author: Option<String>,

    /// Passed to git commit.
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,
}

impl GitCcArgs {
    /// Flags forwarded to `git commit` after the message.
    pub fn git_commit_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        for (set, flag) in [
            (self.all, "--all"),
            (self.signoff, "--signoff"),
            (self.no_signoff, "--no-signoff"),
            (self.no_verify, "--no-verify"),
            (self.verify, "--verify"),
            (self.no_gpg_sign, "--no-gpg-sign"),
            (self.no_post_rewrite, "--no-post-rewrite"),
            (self.allow_empty, "--allow-empty"),
        ] {
            if set {
                flags.push(flag.to_string());
            }
        }
        if let Some(author) = &self.author {
            flags.push(format!("--author={author}"));
        }
        if let Some(date) = &self.date {
            flags.push(format!("--date={date}"));
        }
        if self.no_edit || !self.messages.is_empty() {
            flags.push("--no-edit".to_string());
        } else {
            flags.push("--edit".to_string());
        }
        flags
    }

    /// The message as typed: `-m` paragraphs win over bare words.
    pub fn commit_message(&self) -> CommitMessage {
        if self.messages.is_empty() {
            CommitMessage::parse(&self.words.join(" "))
        } else {
            CommitMessage::from_paragraphs(&self.messages)
        }
    }
}

/// Which name `--init` gives the config file. Both are YAML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Yml,
}

impl ConfigFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => DEFAULT_FILE,
            ConfigFormat::Yml => "commit_convention.yml",
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("could not run `{command}`")]
    #[diagnostic(code(gitcc::cli::spawn), help("is git installed and on your PATH?"))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed")]
    #[diagnostic(code(gitcc::cli::git))]
    Git {
        command: String,
        #[help]
        stderr: Option<String>,
    },

    #[error("no files staged")]
    #[diagnostic(
        code(gitcc::cli::nothing_staged),
        help("stage changes with `git add`, or pass --all or --allow-empty")
    )]
    NothingStaged,

    #[error("the previous commit message at {path} is empty")]
    #[diagnostic(code(gitcc::cli::empty_redo))]
    EmptyRedo { path: PathBuf },

    #[error("could not read {path}")]
    #[diagnostic(code(gitcc::cli::io))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {path}")]
    #[diagnostic(code(gitcc::cli::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write to standard output")]
    #[diagnostic(code(gitcc::cli::output))]
    Output(#[source] io::Error),

    #[error("could not encode the message as JSON")]
    #[diagnostic(code(gitcc::cli::json))]
    Json(#[from] serde_json::Error),

    #[error("the commit message has {count} problem(s)")]
    #[diagnostic(code(gitcc::cli::invalid_message))]
    InvalidMessage {
        count: usize,
        #[related]
        issues: Vec<crate::commit::validate::ValidationIssue>,
    },
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber when `RUST_LOG` is set. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Parse the process arguments and run.
pub fn run() {
    let args = GitCcArgs::parse();
    if let Err(e) = execute(&args) {
        eprintln!("{:?}", Report::new(e));
        process::exit(1);
    }
}

pub fn execute(args: &GitCcArgs) -> Result<(), CliError> {
    if let Some(shell) = args.generate_shell_completion {
        let mut command = GitCcArgs::command();
        clap_complete::generate(shell, &mut command, "git-cc", &mut io::stdout());
        return Ok(());
    }
    if args.generate_man_page {
        return clap_mangen::Man::new(GitCcArgs::command())
            .render(&mut io::stdout())
            .map_err(CliError::Output);
    }

    let cwd = env::current_dir().map_err(|source| CliError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    let root = config_root(&cwd);
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&root)?,
    };

    if args.show_config {
        print_config_search(&root, &config);
        return Ok(());
    }
    if args.init {
        let path = root.join(args.config_format.file_name());
        Config::default().write_new(&path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let message = if args.redo {
        CommitMessage::parse(&read_last_message()?)
    } else {
        args.commit_message()
    };
    debug!(?message, "parsed commit message");

    let issues = message.validate(&config);
    if !issues.is_empty() {
        return Err(CliError::InvalidMessage {
            count: issues.len(),
            issues,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    let text = message.to_string();
    let mut command = vec!["git".to_string(), "commit".into(), "--message".into(), text.clone()];
    command.extend(args.git_commit_flags());

    if args.dry_run {
        match commit_message_file() {
            Ok(path) => save_message(&path, &text)?,
            Err(err) => debug!(%err, "not in a git repository; message not saved"),
        }
        println!("{text}");
        print_would_run(&command);
        return Ok(());
    }

    // --redo reads this back if a hook rejects the commit.
    save_message(&commit_message_file()?, &text)?;
    if !args.all && !args.allow_empty && !has_staged_changes()? {
        return Err(CliError::NothingStaged);
    }
    run_git(&command)
}

// ============================================================================
// GIT
// ============================================================================

fn git_output(args: &[&str]) -> Result<String, CliError> {
    let command = format!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|source| CliError::Spawn {
            command: command.clone(),
            source,
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(CliError::Git {
            command,
            stderr: (!stderr.is_empty()).then_some(stderr),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Where config files are searched: the repository root, or `cwd` outside a
/// repository.
fn config_root(cwd: &Path) -> PathBuf {
    match git_output(&["rev-parse", "--show-toplevel"]) {
        Ok(top) if !top.trim().is_empty() => PathBuf::from(top.trim()),
        Ok(_) => cwd.to_path_buf(),
        Err(err) => {
            debug!(%err, "no repository root; searching the working directory");
            cwd.to_path_buf()
        }
    }
}

fn commit_message_file() -> Result<PathBuf, CliError> {
    let git_dir = git_output(&["rev-parse", "--git-dir"])?;
    Ok(Path::new(git_dir.trim()).join(COMMIT_MESSAGE_FILE))
}

fn save_message(path: &Path, text: &str) -> Result<(), CliError> {
    debug!(path = %path.display(), "saving commit message");
    std::fs::write(path, format!("{text}\n")).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn has_staged_changes() -> Result<bool, CliError> {
    Ok(!git_output(&["diff", "--name-only", "--cached"])?
        .trim()
        .is_empty())
}

fn run_git(command: &[String]) -> Result<(), CliError> {
    let shown = command.join(" ");
    debug!(command = %shown, "running git");
    let status = Command::new(&command[0])
        .args(&command[1..])
        .status()
        .map_err(|source| CliError::Spawn {
            command: shown.clone(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::Git {
            command: shown,
            stderr: None,
        })
    }
}

/// The message git kept from the last commit attempt, without `#` comments.
fn read_last_message() -> Result<String, CliError> {
    let path = commit_message_file()?;
    let text = std::fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    let message = strip_comments(&text);
    if message.is_empty() {
        return Err(CliError::EmptyRedo { path });
    }
    Ok(message)
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

// ============================================================================
// OUTPUT
// ============================================================================

fn print_would_run(command: &[String]) {
    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = write!(stdout, "would run:");
    let _ = stdout.reset();
    let quoted: Vec<String> = command.iter().map(|part| shell_quote(part)).collect();
    let _ = writeln!(stdout, " {}", quoted.join(" "));
}

fn print_config_search(root: &Path, config: &Config) {
    for candidate in Config::candidates(root) {
        println!("# {}", candidate.display());
    }
    match &config.source {
        Some(path) => println!("config file path: {}", path.display()),
        None => println!("config file path: <default>"),
    }
}

fn shell_quote(part: &str) -> String {
    if !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> GitCcArgs {
        GitCcArgs::parse_from(std::iter::once("git-cc").chain(argv.iter().copied()))
    }

    #[test]
    fn words_are_joined() {
        let parsed = args(&["fix:", "the", "thing"]).commit_message();
        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.description, "the thing");
    }

    #[test]
    fn messages_become_paragraphs() {
        let parsed = args(&["-m", "feat: a", "-m", "body text"]).commit_message();
        assert_eq!(parsed.description, "a");
        assert_eq!(parsed.body, "body text");
    }

    #[test]
    fn message_implies_no_edit() {
        let flags = args(&["-a", "-m", "fix: x", "--author=A <a@b.c>"]).git_commit_flags();
        assert_eq!(flags, ["--all", "--author=A <a@b.c>", "--no-edit"]);
        assert_eq!(args(&["fix: x"]).git_commit_flags(), ["--edit"]);
    }

    #[test]
    fn pass_through_flags_are_forwarded() {
        let flags = args(&[
            "--no-signoff",
            "--verify",
            "--no-gpg-sign",
            "--no-post-rewrite",
            "--no-edit",
            "fix: x",
        ])
        .git_commit_flags();
        assert_eq!(
            flags,
            ["--no-signoff", "--verify", "--no-gpg-sign", "--no-post-rewrite", "--no-edit"]
        );
    }

    #[test]
    fn opposite_flags_conflict() {
        for pair in [["-s", "--no-signoff"], ["-n", "--verify"]] {
            let argv = ["git-cc", pair[0], pair[1], "fix: x"];
            assert!(GitCcArgs::try_parse_from(argv).is_err(), "{pair:?}");
        }
    }

    #[test]
    fn config_format_needs_init() {
        assert!(GitCcArgs::try_parse_from(["git-cc", "--config-format", "yml"]).is_err());
        let parsed = args(&["--init", "--config-format", "yml"]);
        assert_eq!(parsed.config_format.file_name(), "commit_convention.yml");
        assert_eq!(args(&["--init"]).config_format.file_name(), DEFAULT_FILE);
    }

    #[test]
    fn command_definition_is_consistent() {
        GitCcArgs::command().debug_assert();
    }

    #[test]
    fn redo_conflicts_with_message() {
        let result = GitCcArgs::try_parse_from(["git-cc", "--redo", "-m", "fix: x"]);
        assert!(result.is_err());
    }

    #[test]
    fn comments_are_dropped() {
        let text = "fix: x\n\nbody\n# Please enter the commit message\n#\n";
        assert_eq!(strip_comments(text), "fix: x\n\nbody");
    }

    #[test]
    fn quoting_only_when_needed() {
        assert_eq!(shell_quote("--no-edit"), "--no-edit");
        assert_eq!(shell_quote("fix: it's done"), r"'fix: it'\''s done'");
    }
}
