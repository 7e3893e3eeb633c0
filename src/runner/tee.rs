//! Output duplication: every chunk a child process writes is forwarded to the
//! invoking terminal and to the invocation's log file.

use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Pairs a terminal stream with the shared log file handle.
///
/// Writes go to the terminal first; if that write fails the whole call fails
/// and the log file receives nothing for that chunk. The two sinks are
/// therefore not guaranteed to stay in lockstep under partial failure, and
/// callers must not assume they do.
///
/// One sink exists per standard stream per invocation. The log handle is
/// shared between the stdout and stderr sinks, serialized by the mutex.
pub struct TeeSink<W> {
    terminal: W,
    log: Arc<Mutex<File>>,
}

impl<W: Write> TeeSink<W> {
    pub fn new(terminal: W, log: Arc<Mutex<File>>) -> Self {
        Self { terminal, log }
    }
}

impl<W: Write> Write for TeeSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.terminal.write_all(buf)?;
        let mut log = self
            .log
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        log.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.terminal.flush()?;
        let mut log = self
            .log
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        log.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_log(tag: &str) -> (PathBuf, Arc<Mutex<File>>) {
        let path = std::env::temp_dir().join(format!(
            "agent_util_tee_{}_{}.log",
            tag,
            std::process::id()
        ));
        // Using a file in the system temp directory instead of the `tempfile` crate.
        let file = File::create(&path).unwrap();
        (path, Arc::new(Mutex::new(file)))
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("terminal gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn duplicates_bytes_to_both_sinks() {
        let (path, log) = temp_log("both");
        let mut terminal: Vec<u8> = Vec::new();
        {
            let mut sink = TeeSink::new(&mut terminal, Arc::clone(&log));
            sink.write_all(b"alpha ").unwrap();
            sink.write_all(b"beta").unwrap();
            sink.flush().unwrap();
        }
        assert_eq!(terminal, b"alpha beta");
        assert_eq!(std::fs::read(&path).unwrap(), b"alpha beta");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn terminal_failure_skips_log_write() {
        let (path, log) = temp_log("fail");
        let mut sink = TeeSink::new(FailingWriter, Arc::clone(&log));
        let err = sink.write(b"never recorded").unwrap_err();
        assert_eq!(err.to_string(), "terminal gone");
        drop(sink);
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"",
            "log must not see a chunk the terminal rejected"
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reported_count_covers_whole_chunk() {
        let (path, log) = temp_log("count");
        let mut terminal: Vec<u8> = Vec::new();
        let n = TeeSink::new(&mut terminal, Arc::clone(&log))
            .write(b"12345")
            .unwrap();
        assert_eq!(n, 5);
        let _ = std::fs::remove_file(&path);
    }
}
