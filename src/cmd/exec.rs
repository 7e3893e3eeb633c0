/*!
`exec`: run an arbitrary program under the logging wrapper.

Two equivalent forms:
  agent-util exec -- cargo build --release
  agent-util exec -c "cargo build --release"

The quoted form is split with shell-words rules (quoting and escapes are
honored, nothing is expanded). No shell is involved in either form: the
argument vector reaches the child verbatim.

`--json` prints a machine-readable summary after the run:
{
  "status": "ok",
  "program": "cargo",
  "exit_code": 0,
  "log_path": "logs/cargo_1700000000.log",
  "elapsed_ms": 42
}
or, on failure:
{
  "status": "error",
  "error": "command failed: exit status 1"
}
*/

use anyhow::Result;
use clap::Args;

use crate::runner::{ProcessRunner, RunOutcome, RunnerConfig};
use crate::utils::ContextExt;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Program followed by its arguments (put `--` before leading-dash args)
    #[arg(
        value_name = "PROGRAM",
        trailing_var_arg = true,
        allow_hyphen_values = true,
        required_unless_present = "command_line",
        conflicts_with = "command_line"
    )]
    pub argv: Vec<String>,

    /// Whole command as one quoted string, split with shell-words rules
    #[arg(short = 'c', long = "command", value_name = "COMMAND")]
    pub command_line: Option<String>,

    /// Print a machine-readable run summary
    #[arg(long)]
    pub json: bool,
}

pub fn execute_exec(args: ExecArgs, config: &RunnerConfig) -> Result<()> {
    let argv = resolve_argv(&args)?;
    let Some((program, rest)) = argv.split_first() else {
        anyhow::bail!("no command given");
    };

    match ProcessRunner::new(config).run(program, rest) {
        Ok(outcome) => {
            if args.json {
                print_summary(program, &outcome);
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                let err = serde_json::json!({"status": "error", "error": e.to_string()});
                println!(
                    "{}",
                    serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string())
                );
            }
            Err(e.into())
        }
    }
}

fn resolve_argv(args: &ExecArgs) -> Result<Vec<String>> {
    if let Some(line) = &args.command_line {
        let argv = shell_words::split(line).ctx("failed to parse --command string")?;
        if argv.is_empty() {
            anyhow::bail!("--command string is empty");
        }
        return Ok(argv);
    }
    Ok(args.argv.clone())
}

fn print_summary(program: &str, outcome: &RunOutcome) {
    let mut summary = serde_json::to_value(outcome).unwrap_or_else(|_| serde_json::json!({}));
    if let serde_json::Value::Object(map) = &mut summary {
        map.insert("status".to_string(), serde_json::json!("ok"));
        map.insert("program".to_string(), serde_json::json!(program));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).unwrap_or_else(|_| summary.to_string())
    );
}
