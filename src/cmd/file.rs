//! `file`: directory listing and file display, captured like any other run.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::runner::{ProcessRunner, RunnerConfig};

#[derive(Args, Debug)]
pub struct FileArgs {
    #[command(subcommand)]
    pub action: FileAction,
}

#[derive(Subcommand, Debug)]
pub enum FileAction {
    /// List directory contents (long form, hidden files included)
    Ls { path: Option<String> },

    /// Print a file to stdout
    Cat { file: String },
}

pub fn execute_file(args: FileArgs, config: &RunnerConfig) -> Result<()> {
    let (program, argv) = build_file_command(&args.action);
    ProcessRunner::new(config).run(program, &argv)?;
    Ok(())
}

fn build_file_command(action: &FileAction) -> (&'static str, Vec<String>) {
    match action {
        FileAction::Ls { path } => {
            let target = path.clone().unwrap_or_else(|| ".".to_string());
            ("ls", vec!["-la".to_string(), target])
        }
        FileAction::Cat { file } => ("cat", vec![file.clone()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ls_defaults_to_current_directory() {
        let (program, argv) = build_file_command(&FileAction::Ls { path: None });
        assert_eq!(program, "ls");
        assert_eq!(argv, ["-la", "."]);
    }

    #[test]
    fn cat_takes_the_file_verbatim() {
        let (program, argv) = build_file_command(&FileAction::Cat {
            file: "README.md".into(),
        });
        assert_eq!(program, "cat");
        assert_eq!(argv, ["README.md"]);
    }
}
