/*!
Subcommand modules.

Each wrapped tool lives in its own file and exposes one public `execute_*`
function returning `anyhow::Result<()>`. The modules hold no execution logic
of their own: they turn CLI arguments into a program name plus an argument
vector (via a pure, unit-tested builder) and hand both to
[`crate::runner::ProcessRunner`], which owns spawning, output capture, and
the log file lifecycle.

Layout:
  src/cmd/
    mod.rs      (this file: declarations + re-exports)
    exec.rs     (arbitrary command)
    git.rs      (version control)
    buf.rs      (protocol buffers)
    file.rs     (ls / cat)
    python.rs   (interpreter / pytest)
    npm.rs      (package manager)
    lint.rs     (data-driven linter table)
*/

pub mod buf;
pub mod exec;
pub mod file;
pub mod git;
pub mod lint;
pub mod npm;
pub mod python;

pub use buf::{BufArgs, execute_buf};
pub use exec::{ExecArgs, execute_exec};
pub use file::{FileArgs, execute_file};
pub use git::{GitArgs, execute_git};
pub use lint::{LintArgs, execute_lint};
pub use npm::{NpmArgs, execute_npm};
pub use python::{PythonArgs, execute_python};
