/*!
`lint`: run a linter from a fixed, data-driven table.

The table below is the whole dispatch mechanism: linter name mapped to an
executable plus its leading arguments. Adding a linter means adding a row,
nothing else. `--list` prints the table.
*/

use anyhow::Result;
use clap::Args;

use crate::runner::{ProcessRunner, RunnerConfig};
use crate::utils::output::{Color, color};

/// One linter the dispatcher knows how to invoke.
pub struct LinterSpec {
    pub name: &'static str,
    pub program: &'static str,
    pub base_args: &'static [&'static str],
    pub summary: &'static str,
}

pub static LINTERS: &[LinterSpec] = &[
    LinterSpec {
        name: "eslint",
        program: "eslint",
        base_args: &[],
        summary: "JavaScript / TypeScript",
    },
    LinterSpec {
        name: "prettier",
        program: "prettier",
        base_args: &["--check"],
        summary: "formatting check",
    },
    LinterSpec {
        name: "ruff",
        program: "ruff",
        base_args: &["check"],
        summary: "Python",
    },
    LinterSpec {
        name: "black",
        program: "black",
        base_args: &["--check"],
        summary: "Python formatting",
    },
    LinterSpec {
        name: "shellcheck",
        program: "shellcheck",
        base_args: &[],
        summary: "shell scripts",
    },
    LinterSpec {
        name: "yamllint",
        program: "yamllint",
        base_args: &[],
        summary: "YAML",
    },
];

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Linter name from the built-in table
    #[arg(value_name = "LINTER", required_unless_present = "list")]
    pub linter: Option<String>,

    /// Paths handed to the linter (defaults to the current directory)
    pub paths: Vec<String>,

    /// Show the available linters
    #[arg(long)]
    pub list: bool,
}

pub fn execute_lint(args: LintArgs, config: &RunnerConfig) -> Result<()> {
    if args.list {
        print_linter_table();
        return Ok(());
    }

    let Some(name) = args.linter.as_deref() else {
        anyhow::bail!("missing linter name (try --list)");
    };
    let Some(spec) = find_linter(name) else {
        anyhow::bail!("unknown linter '{name}' (try --list)");
    };

    let argv = build_lint_args(spec, &args.paths);
    ProcessRunner::new(config).run(spec.program, &argv)?;
    Ok(())
}

fn build_lint_args(spec: &LinterSpec, paths: &[String]) -> Vec<String> {
    let mut argv: Vec<String> = spec.base_args.iter().map(|s| s.to_string()).collect();
    if paths.is_empty() {
        argv.push(".".to_string());
    } else {
        argv.extend(paths.iter().cloned());
    }
    argv
}

fn find_linter(name: &str) -> Option<&'static LinterSpec> {
    LINTERS.iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

fn print_linter_table() {
    println!("{}", color(Color::Bold, "Available linters:"));
    for l in LINTERS {
        let invocation = if l.base_args.is_empty() {
            l.program.to_string()
        } else {
            format!("{} {}", l.program, l.base_args.join(" "))
        };
        println!(
            "  {}  {:<18} {}",
            color(Color::Cyan, format!("{:<12}", l.name)),
            invocation,
            l.summary
        );
    }
}
