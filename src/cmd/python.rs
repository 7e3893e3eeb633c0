//! `python`: interpreter and test-suite wrappers (python3 / pytest).

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::runner::{ProcessRunner, RunnerConfig};

#[derive(Args, Debug)]
pub struct PythonArgs {
    #[command(subcommand)]
    pub action: PythonAction,
}

#[derive(Subcommand, Debug)]
pub enum PythonAction {
    /// Run a script with the python3 interpreter
    Run {
        script: String,

        /// Arguments passed through to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the pytest suite
    Test {
        /// Arguments passed through to pytest
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

pub fn execute_python(args: PythonArgs, config: &RunnerConfig) -> Result<()> {
    let argv = build_python_args(&args.action);
    ProcessRunner::new(config).run("python3", &argv)?;
    Ok(())
}

fn build_python_args(action: &PythonAction) -> Vec<String> {
    match action {
        PythonAction::Run { script, args } => {
            let mut v = vec![script.clone()];
            v.extend(args.iter().cloned());
            v
        }
        PythonAction::Test { args } => {
            let mut v = vec!["-m".to_string(), "pytest".to_string()];
            v.extend(args.iter().cloned());
            v
        }
    }
}
