use clap::{Parser, Subcommand};

mod cmd;
mod runner;
mod utils;

use cmd::{BufArgs, ExecArgs, FileArgs, GitArgs, LintArgs, NpmArgs, PythonArgs};
use runner::{RunError, RunnerConfig};

/// agent-util - uniform execution wrapper for development tools
///
/// Every subcommand spawns the wrapped tool with the invocation's working
/// directory, mirrors its output to the terminal, and records the same bytes
/// in a fresh `logs/<program>_<unix-seconds>.log` with a header and a
/// trailing status line. Exit status is 0 when the child succeeded and 1 on
/// any failure (log setup, spawn, or non-zero child exit).
///
/// Command layout:
///   agent-util exec [-c "<command>"] [--json] [--] <program> [args...]
///   agent-util git  <add|commit|push|pull|status|log|diff|checkout|branch> ...
///   agent-util buf  <generate|lint|breaking|format> ...
///   agent-util file <ls|cat> ...
///   agent-util python <run|test> ...
///   agent-util npm  <install|ci|run|build|test> ...
///   agent-util lint <linter> [paths...] | --list
///
/// Global flags:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///
/// Examples:
///   agent-util git add
///   agent-util git commit -m "fix: handle empty input"
///   agent-util exec --json -- cargo build --release
///   agent-util lint ruff src/
#[derive(Parser, Debug)]
#[command(
    name = "agent-util",
    version,
    author,
    about = "Uniform execution wrapper for development tools with captured logs",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute an arbitrary program
    Exec(ExecArgs),

    /// Version-control operations
    Git(GitArgs),

    /// Protocol-buffer operations
    Buf(BufArgs),

    /// File operations
    File(FileArgs),

    /// Python development tools
    Python(PythonArgs),

    /// npm / node operations
    Npm(NpmArgs),

    /// Run a configured linter
    Lint(LintArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // One working-directory snapshot per process; every command execution
    // sees the same configuration.
    let config = match RunnerConfig::from_current_dir(cli.verbose > 0) {
        Ok(config) => config,
        Err(e) => {
            crate::log_error!("Cannot resolve working directory: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Exec(args) => cmd::execute_exec(args, &config),
        Commands::Git(args) => cmd::execute_git(args, &config),
        Commands::Buf(args) => cmd::execute_buf(args, &config),
        Commands::File(args) => cmd::execute_file(args, &config),
        Commands::Python(args) => cmd::execute_python(args, &config),
        Commands::Npm(args) => cmd::execute_npm(args, &config),
        Commands::Lint(args) => cmd::execute_lint(args, &config),
    };

    if let Err(err) = result {
        // Runner failures already reported themselves (terminal + log) at the
        // point of failure; anything else still needs a message.
        if err.downcast_ref::<RunError>().is_none() {
            crate::log_error!("{err:#}");
        }
        std::process::exit(1);
    }
}
