/*!
Subprocess execution with dual-output logging.

Every wrapped tool invocation funnels through [`ProcessRunner::run`]: the
child's stdout and stderr are duplicated, byte for byte, to the invoking
terminal and to a per-invocation log file under `logs/`, and the outcome is
reported uniformly no matter which subcommand built the argument list.

Flow per invocation:
  1. Ensure the log directory exists (fatal before anything runs).
  2. Allocate `logs/<program>_<unix-seconds>.log`; same-second reruns of the
     same program get a `_1`, `_2`, ... suffix instead of overwriting.
  3. Write a header block (command line, working directory, RFC3339 start
     time) followed by a `--- Output ---` separator.
  4. Spawn the child in the configured working directory with both standard
     streams piped through [`TeeSink`]s.
  5. Block until exit, then append a trailing status line to the log and
     print the same line to the terminal.

The runner never terminates the process itself; it hands a typed
[`RunError`] back to `main`, which owns the exit status. Errors are reported
(terminal + log where the log is open) at the point of failure.
*/

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::utils::output::{Color, color};
use crate::{log_debug, log_error, log_info};

mod tee;
pub use tee::TeeSink;

const SUCCESS_LINE: &str = "Command completed successfully";

/// Where commands run and where their logs land. Built once at startup and
/// passed by reference everywhere; never recomputed mid-invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub working_dir: PathBuf,
    pub log_dir: PathBuf,
    pub verbose: bool,
}

impl RunnerConfig {
    /// Snapshot the process working directory. The log directory lives under
    /// it as `logs/`.
    pub fn from_current_dir(verbose: bool) -> io::Result<Self> {
        let working_dir = std::env::current_dir()?;
        let log_dir = working_dir.join("logs");
        Ok(Self {
            working_dir,
            log_dir,
            verbose,
        })
    }

    /// Root both the working directory and the log directory at an explicit
    /// path instead of the process working directory.
    pub fn rooted_at(dir: impl Into<PathBuf>) -> Self {
        let working_dir = dir.into();
        let log_dir = working_dir.join("logs");
        Self {
            working_dir,
            log_dir,
            verbose: false,
        }
    }
}

/// Distinguishable failure points of one invocation. All are fatal; none are
/// retried.
#[derive(Error, Debug)]
pub enum RunError {
    /// Log directory or log file could not be created or written.
    #[error("log setup failed: {0}")]
    Setup(io::Error),

    /// The named program could not be found or started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },

    /// The child ran and exited non-zero or died to a signal.
    #[error("command failed: {detail}")]
    Child { detail: String },
}

/// Summary of a successful invocation, serializable for `--json` output.
#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub exit_code: i32,
    pub log_path: PathBuf,
    pub elapsed_ms: u64,
}

pub struct ProcessRunner<'a> {
    config: &'a RunnerConfig,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(config: &'a RunnerConfig) -> Self {
        Self { config }
    }

    /// Synchronous wrapper: creates a runtime and blocks on [`Self::run_async`].
    pub fn run(&self, program: &str, args: &[String]) -> Result<RunOutcome, RunError> {
        let rt = tokio::runtime::Runtime::new().map_err(|e| RunError::Spawn {
            program: program.to_string(),
            source: e,
        })?;
        rt.block_on(self.run_async(program, args))
    }

    pub async fn run_async(&self, program: &str, args: &[String]) -> Result<RunOutcome, RunError> {
        let started = Instant::now();

        fs::create_dir_all(&self.config.log_dir).map_err(|e| {
            log_error!(
                "Cannot create log directory {}: {e}",
                self.config.log_dir.display()
            );
            RunError::Setup(e)
        })?;

        let log_path = allocate_log_path(&self.config.log_dir, program, Utc::now().timestamp());
        let file = File::create(&log_path).map_err(|e| {
            log_error!("Cannot create log file {}: {e}", log_path.display());
            RunError::Setup(e)
        })?;
        let log = Arc::new(Mutex::new(file));

        log_info!("Executing: {}", render_command_line(program, args));
        log_info!("Log file: {}", log_path.display());
        if self.config.verbose {
            log_debug!("Working directory: {}", self.config.working_dir.display());
        }

        write_header(&log, program, args, &self.config.working_dir).map_err(|e| {
            log_error!("Cannot write to log file {}: {e}", log_path.display());
            RunError::Setup(e)
        })?;

        let mut child = match Command::new(program)
            .args(args)
            .current_dir(&self.config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let err = RunError::Spawn {
                    program: program.to_string(),
                    source: e,
                };
                let line = format!("Command failed: {err}");
                let _ = append_line(&log, &line);
                eprintln!("{}", color(Color::Red, &line));
                return Err(err);
            }
        };

        let out_pump = child
            .stdout
            .take()
            .map(|s| tokio::spawn(pump(s, TeeSink::new(io::stdout(), Arc::clone(&log)))));
        let err_pump = child
            .stderr
            .take()
            .map(|s| tokio::spawn(pump(s, TeeSink::new(io::stderr(), Arc::clone(&log)))));

        // Drain both streams fully before judging the exit status so the log
        // holds every captured byte ahead of the trailing line.
        let mut capture_err: Option<io::Error> = None;
        for task in [out_pump, err_pump].into_iter().flatten() {
            let result = match task.await {
                Ok(r) => r,
                Err(e) => Err(io::Error::other(e)),
            };
            if let Err(e) = result
                && capture_err.is_none()
            {
                capture_err = Some(e);
            }
        }

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                let detail = format!("wait failed: {e}");
                return Err(self.fail(&log, detail));
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.success() {
            return Err(self.fail(&log, describe_failure(&status)));
        }
        if let Some(e) = capture_err {
            return Err(self.fail(&log, format!("output capture failed: {e}")));
        }

        append_line(&log, SUCCESS_LINE).map_err(|e| {
            log_error!("Cannot write to log file {}: {e}", log_path.display());
            RunError::Setup(e)
        })?;
        println!("{}", color(Color::Green, SUCCESS_LINE));

        if self.config.verbose {
            log_debug!("Completed in {elapsed_ms} ms");
        }

        Ok(RunOutcome {
            exit_code: 0,
            log_path,
            elapsed_ms,
        })
    }

    /// Best-effort trailing failure line to log + terminal, then the typed error.
    fn fail(&self, log: &Mutex<File>, detail: String) -> RunError {
        let line = format!("Command failed: {detail}");
        let _ = append_line(log, &line);
        eprintln!("{}", color(Color::Red, &line));
        RunError::Child { detail }
    }
}

async fn pump<R, W>(mut reader: R, mut sink: TeeSink<W>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])?;
    }
    sink.flush()
}

/// Pick `<stem>_<unix-seconds>.log`, probing `_1`, `_2`, ... when a run of
/// the same program within the same second already claimed the base name.
fn allocate_log_path(dir: &Path, program: &str, unix_secs: i64) -> PathBuf {
    // Only the final path component, so "./tool" and absolute program paths
    // still yield sane file names.
    let stem = Path::new(program)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string());

    let base = dir.join(format!("{stem}_{unix_secs}.log"));
    if !base.exists() {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}_{unix_secs}_{n}.log"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn render_command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

fn write_header(
    log: &Mutex<File>,
    program: &str,
    args: &[String],
    working_dir: &Path,
) -> io::Result<()> {
    let mut f = log.lock().map_err(|_| poisoned())?;
    writeln!(f, "Command: {}", render_command_line(program, args))?;
    writeln!(f, "Working Directory: {}", working_dir.display())?;
    writeln!(
        f,
        "Timestamp: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    writeln!(f, "--- Output ---")
}

fn append_line(log: &Mutex<File>, line: &str) -> io::Result<()> {
    let mut f = log.lock().map_err(|_| poisoned())?;
    writeln!(f, "{line}")
}

fn poisoned() -> io::Error {
    io::Error::other("log file lock poisoned")
}

fn describe_failure(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => {
            #[cfg(unix)]
            {
                use std::os::unix::process::ExitStatusExt;
                if let Some(sig) = status.signal() {
                    return format!("terminated by signal {sig}");
                }
            }
            "terminated abnormally".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_root(tag: &str) -> PathBuf {
        // Using a directory under the system temp dir instead of the `tempfile` crate.
        let dir = std::env::temp_dir().join(format!(
            "agent_util_runner_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn read_log(outcome: &RunOutcome) -> String {
        fs::read_to_string(&outcome.log_path).unwrap()
    }

    #[test]
    fn echo_is_captured_with_header_and_success_line() {
        let root = test_root("echo");
        let config = RunnerConfig::rooted_at(&root);
        let outcome = ProcessRunner::new(&config)
            .run("echo", &["hello".to_string()])
            .unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.log_path.exists());

        let content = read_log(&outcome);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Command: echo hello");
        assert!(lines[1].starts_with("Working Directory: "));
        assert!(lines[2].starts_with("Timestamp: "));
        assert_eq!(lines[3], "--- Output ---");
        assert!(content.contains("hello\n"));
        assert!(content.ends_with("Command completed successfully\n"));
    }

    #[test]
    fn nonzero_exit_becomes_child_error_with_detail_in_log() {
        let root = test_root("false");
        let config = RunnerConfig::rooted_at(&root);
        let err = ProcessRunner::new(&config)
            .run("false", &[])
            .unwrap_err();

        match &err {
            RunError::Child { detail } => assert_eq!(detail, "exit status 1"),
            other => panic!("expected Child error, got {other:?}"),
        }

        let log = fs::read_dir(root.join("logs"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let content = fs::read_to_string(log).unwrap();
        assert_eq!(
            content.lines().last().unwrap(),
            "Command failed: exit status 1"
        );
        // "false" produces no output: separator and trailing line are adjacent.
        assert!(content.contains("--- Output ---\nCommand failed:"));
    }

    #[test]
    fn missing_program_is_spawn_error_recorded_in_log() {
        let root = test_root("missing");
        let config = RunnerConfig::rooted_at(&root);
        let err = ProcessRunner::new(&config)
            .run("agent-util-no-such-program", &[])
            .unwrap_err();

        assert!(matches!(err, RunError::Spawn { .. }));

        let log = fs::read_dir(root.join("logs"))
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let content = fs::read_to_string(log).unwrap();
        assert!(
            content
                .lines()
                .last()
                .unwrap()
                .starts_with("Command failed: failed to start 'agent-util-no-such-program'")
        );
    }

    #[test]
    fn unusable_log_dir_is_setup_error_and_nothing_spawns() {
        let root = test_root("setup");
        // A plain file where the log directory's parent should be.
        let blocked = root.join("blocked");
        fs::write(&blocked, b"not a directory").unwrap();

        let config = RunnerConfig {
            working_dir: root.clone(),
            log_dir: blocked.join("logs"),
            verbose: false,
        };
        let err = ProcessRunner::new(&config)
            .run("echo", &["never".to_string()])
            .unwrap_err();

        assert!(matches!(err, RunError::Setup(_)));
        assert!(!blocked.join("logs").exists());
    }

    #[test]
    fn stderr_and_stdout_both_reach_the_log() {
        let root = test_root("streams");
        let config = RunnerConfig::rooted_at(&root);
        let outcome = ProcessRunner::new(&config)
            .run(
                "sh",
                &["-c".to_string(), "echo out; echo err >&2".to_string()],
            )
            .unwrap();

        let content = read_log(&outcome);
        assert!(content.contains("out\n"));
        assert!(content.contains("err\n"));
    }

    #[test]
    fn child_runs_in_the_configured_working_directory() {
        let root = test_root("cwd");
        let config = RunnerConfig::rooted_at(&root);
        let outcome = ProcessRunner::new(&config).run("pwd", &[]).unwrap();

        let content = read_log(&outcome);
        let expected = root.canonicalize().unwrap();
        assert!(
            content.contains(&format!("{}\n", expected.display())),
            "pwd output should be the configured root, log was:\n{content}"
        );
    }

    #[test]
    fn back_to_back_runs_get_distinct_log_files() {
        let root = test_root("twice");
        let config = RunnerConfig::rooted_at(&root);
        let runner = ProcessRunner::new(&config);
        let first = runner.run("echo", &["one".to_string()]).unwrap();
        let second = runner.run("echo", &["two".to_string()]).unwrap();

        assert_ne!(first.log_path, second.log_path);
        assert!(first.log_path.exists());
        assert!(second.log_path.exists());
    }

    #[test]
    fn same_second_allocation_appends_counter() {
        let root = test_root("alloc");
        let logs = root.join("logs");
        fs::create_dir_all(&logs).unwrap();

        let first = allocate_log_path(&logs, "echo", 1_700_000_000);
        assert_eq!(first, logs.join("echo_1700000000.log"));
        fs::write(&first, b"").unwrap();

        let second = allocate_log_path(&logs, "echo", 1_700_000_000);
        assert_eq!(second, logs.join("echo_1700000000_1.log"));
        fs::write(&second, b"").unwrap();

        let third = allocate_log_path(&logs, "echo", 1_700_000_000);
        assert_eq!(third, logs.join("echo_1700000000_2.log"));
    }

    #[test]
    fn program_path_is_reduced_to_its_file_name() {
        let root = test_root("stem");
        let logs = root.join("logs");
        fs::create_dir_all(&logs).unwrap();

        let path = allocate_log_path(&logs, "/usr/bin/git", 42);
        assert_eq!(path, logs.join("git_42.log"));
    }

    #[tokio::test]
    async fn run_async_works_inside_an_existing_runtime() {
        let root = test_root("async");
        let config = RunnerConfig::rooted_at(&root);
        let outcome = ProcessRunner::new(&config)
            .run_async("echo", &["via-async".to_string()])
            .await
            .unwrap();

        assert!(read_log(&outcome).contains("via-async"));
    }

    #[test]
    fn render_command_line_joins_arguments() {
        assert_eq!(render_command_line("git", &[]), "git");
        assert_eq!(
            render_command_line("git", &["add".to_string(), ".".to_string()]),
            "git add ."
        );
    }
}
