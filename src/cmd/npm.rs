//! `npm`: package-manager wrappers.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::runner::{ProcessRunner, RunnerConfig};

#[derive(Args, Debug)]
pub struct NpmArgs {
    #[command(subcommand)]
    pub action: NpmAction,
}

#[derive(Subcommand, Debug)]
pub enum NpmAction {
    /// Install dependencies
    Install,

    /// Clean install from the lockfile
    Ci,

    /// Run a package.json script
    Run { script: String },

    /// Run the build script
    Build,

    /// Run the test script
    Test,
}

pub fn execute_npm(args: NpmArgs, config: &RunnerConfig) -> Result<()> {
    let argv = build_npm_args(&args.action);
    ProcessRunner::new(config).run("npm", &argv)?;
    Ok(())
}

fn build_npm_args(action: &NpmAction) -> Vec<String> {
    match action {
        NpmAction::Install => vec!["install".to_string()],
        NpmAction::Ci => vec!["ci".to_string()],
        NpmAction::Run { script } => vec!["run".to_string(), script.clone()],
        NpmAction::Build => vec!["run".to_string(), "build".to_string()],
        NpmAction::Test => vec!["test".to_string()],
    }
}
