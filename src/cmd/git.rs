/*!
`git`: version-control wrappers.

Each action maps onto one `git` invocation with a fixed argument shape, so
agents get the same staging/commit/push behavior on every call. `add` with no
paths stages everything; `commit` without `-m` uses an automated message.
*/

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::runner::{ProcessRunner, RunnerConfig};

const AUTO_COMMIT_MESSAGE: &str = "feat: automated commit via agent-util";

#[derive(Args, Debug)]
pub struct GitArgs {
    #[command(subcommand)]
    pub action: GitAction,
}

#[derive(Subcommand, Debug)]
pub enum GitAction {
    /// Stage files (everything when no paths are given)
    Add { files: Vec<String> },

    /// Commit staged changes
    Commit {
        /// Commit message (an automated default is used when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Push to the remote
    Push {
        #[arg(long)]
        force_with_lease: bool,
    },

    /// Fetch and integrate remote changes
    Pull,

    /// Working tree status
    Status,

    /// Recent history, one line per commit
    Log {
        /// Number of commits to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
    },

    /// Changes against the index or HEAD
    Diff {
        /// Compare staged changes instead of the working tree
        #[arg(long)]
        staged: bool,
    },

    /// Switch branches or restore files
    Checkout { target: String },

    /// List branches, or create one when a name is given
    Branch { name: Option<String> },
}

pub fn execute_git(args: GitArgs, config: &RunnerConfig) -> Result<()> {
    let argv = build_git_args(&args.action);
    ProcessRunner::new(config).run("git", &argv)?;
    Ok(())
}

fn build_git_args(action: &GitAction) -> Vec<String> {
    match action {
        GitAction::Add { files } => {
            let mut v = vec!["add".to_string()];
            if files.is_empty() {
                v.push(".".to_string());
            } else {
                v.extend(files.iter().cloned());
            }
            v
        }
        GitAction::Commit { message } => {
            let msg = message
                .clone()
                .unwrap_or_else(|| AUTO_COMMIT_MESSAGE.to_string());
            vec!["commit".to_string(), "-m".to_string(), msg]
        }
        GitAction::Push { force_with_lease } => {
            let mut v = vec!["push".to_string()];
            if *force_with_lease {
                v.push("--force-with-lease".to_string());
            }
            v
        }
        GitAction::Pull => vec!["pull".to_string()],
        GitAction::Status => vec!["status".to_string()],
        GitAction::Log { count } => vec![
            "log".to_string(),
            format!("-n{count}"),
            "--oneline".to_string(),
        ],
        GitAction::Diff { staged } => {
            let mut v = vec!["diff".to_string()];
            if *staged {
                v.push("--staged".to_string());
            }
            v
        }
        GitAction::Checkout { target } => vec!["checkout".to_string(), target.clone()],
        GitAction::Branch { name } => match name {
            Some(n) => vec!["branch".to_string(), n.clone()],
            None => vec!["branch".to_string(), "-a".to_string()],
        },
    }
}
