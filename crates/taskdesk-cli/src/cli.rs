use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use taskdesk_core::{Priority, Scope};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdesk",
    version,
    about = "TaskDesk: command-line client for a TaskDesk server",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Config file; defaults to <config dir>/taskdesk/config.toml.
    #[arg(long = "config", env = "TASKDESK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override a config key, e.g. --set api_base_url=http://localhost:5000
    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<KeyVal>,

    #[arg(long = "api-url", env = "TASKDESK_API_URL", global = true)]
    pub api_url: Option<String>,

    #[arg(short = 'u', long = "username", env = "TASKDESK_USERNAME", global = true)]
    pub username: Option<String>,

    #[arg(
        short = 'p',
        long = "password",
        env = "TASKDESK_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Answer yes to confirmation prompts.
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account with --username and --password.
    Register,
    /// List tasks.
    List(ListArgs),
    /// Create a task.
    Add(AddArgs),
    /// Change fields or tags of a task.
    Edit(EditArgs),
    /// Delete a task after confirmation.
    Delete { id: u64 },
    /// Mark a task completed.
    Done { id: u64 },
    /// Mark a task incomplete.
    Undo { id: u64 },
    /// Ask the assistant about your tasks.
    Ask {
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    #[arg(short = 's', long = "scope", default_value = "all")]
    pub scope: Scope,

    /// Only tasks created by this user.
    #[arg(long = "by")]
    pub created_by: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub title: String,

    #[arg(short = 'd', long = "description", default_value = "")]
    pub description: String,

    /// high, medium, low or 1-3; defaults to the configured priority.
    #[arg(short = 'P', long = "priority")]
    pub priority: Option<Priority>,

    #[arg(short = 't', long = "tag", action = ArgAction::Append)]
    pub tags: Vec<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub id: u64,

    #[arg(long = "title")]
    pub title: Option<String>,

    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,

    #[arg(short = 'P', long = "priority")]
    pub priority: Option<Priority>,

    #[arg(short = 't', long = "tag", action = ArgAction::Append)]
    pub add_tags: Vec<String>,

    #[arg(long = "untag", action = ArgAction::Append)]
    pub remove_tags: Vec<String>,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register => "register",
            Command::List(_) => "list",
            Command::Add(_) => "add",
            Command::Edit(_) => "edit",
            Command::Delete { .. } => "delete",
            Command::Done { .. } => "done",
            Command::Undo { .. } => "undo",
            Command::Ask { .. } => "ask",
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
