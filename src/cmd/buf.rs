/*!
`buf`: protocol-buffer tooling wrappers.

`generate --module <name>` restricts generation to `pkg/<name>/proto`, the
layout convention of the repositories this tool is used in.
*/

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::runner::{ProcessRunner, RunnerConfig};

#[derive(Args, Debug)]
pub struct BufArgs {
    #[command(subcommand)]
    pub action: BufAction,
}

#[derive(Subcommand, Debug)]
pub enum BufAction {
    /// Generate code from proto definitions
    Generate {
        /// Restrict generation to a single module
        #[arg(long)]
        module: Option<String>,
    },

    /// Lint proto files
    Lint,

    /// Check for breaking changes against a baseline
    Breaking {
        /// Baseline to compare against
        #[arg(long, default_value = ".git#branch=main")]
        against: String,
    },

    /// Format proto files
    Format {
        /// Rewrite files in place instead of printing the diff
        #[arg(long)]
        write: bool,
    },
}

pub fn execute_buf(args: BufArgs, config: &RunnerConfig) -> Result<()> {
    let argv = build_buf_args(&args.action);
    ProcessRunner::new(config).run("buf", &argv)?;
    Ok(())
}

fn build_buf_args(action: &BufAction) -> Vec<String> {
    match action {
        BufAction::Generate { module } => match module {
            Some(m) => vec![
                "generate".to_string(),
                "--path".to_string(),
                format!("pkg/{m}/proto"),
            ],
            None => vec!["generate".to_string()],
        },
        BufAction::Lint => vec!["lint".to_string()],
        BufAction::Breaking { against } => vec![
            "breaking".to_string(),
            "--against".to_string(),
            against.clone(),
        ],
        BufAction::Format { write } => {
            let mut v = vec!["format".to_string()];
            if *write {
                v.push("-w".to_string());
            }
            v
        }
    }
}
