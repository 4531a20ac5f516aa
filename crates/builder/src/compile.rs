//! The dependency-install-and-compile step.
//!
//! Runs one shell command in the project directory and yields its stdout and
//! stderr lines as they are produced, merged in arrival order. A line ends at
//! `\n` or `\r`, so carriage-return progress updates come through one by
//! one. Output is decoded lossily; invalid UTF-8 never ends the stream.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::error::BuildError;

/// Buffered output lines between the pipe readers and the publisher.
const LINE_BUFFER: usize = 256;

/// A command to run in the project's working tree.
#[derive(Debug, Clone)]
pub struct CompileStep {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
}

impl CompileStep {
    /// Run `command` through `sh -c` inside `working_dir`.
    pub fn shell(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), command.into()],
            working_dir: working_dir.into(),
        }
    }

    /// Start the command with piped output.
    pub fn spawn(&self) -> Result<RunningCompile, BuildError> {
        // `kill_on_drop(true)` ensures the child does not outlive the executor.
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(BuildError::Spawn)?;

        let (tx, lines) = mpsc::channel(LINE_BUFFER);
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx));
        }

        Ok(RunningCompile { child, lines })
    }
}

/// A started compile command.
#[derive(Debug)]
pub struct RunningCompile {
    child: Child,
    lines: mpsc::Receiver<String>,
}

impl RunningCompile {
    /// Next output line, or `None` once both pipes are closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Wait for the process to exit.
    pub async fn wait(mut self) -> Result<ExitStatus, BuildError> {
        self.child.wait().await.map_err(BuildError::Spawn)
    }
}

/// Read `stream` line by line into `tx`, skipping blank lines.
///
/// The pipe is drained to EOF even after the receiver is gone so the child
/// never blocks on, or dies writing to, a full or closed pipe.
async fn forward_lines<R: AsyncRead + Unpin>(stream: R, tx: mpsc::Sender<String>) {
    let mut reader = BufReader::new(stream);
    let mut sink = LineSink::new(tx);
    loop {
        let chunk = match reader.fill_buf().await {
            Ok([]) => break,
            Ok(chunk) => chunk,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "Build output stream closed with error");
                break;
            }
        };

        let consumed = chunk.len();
        for &byte in chunk {
            match byte {
                b'\n' | b'\r' => sink.flush().await,
                other => sink.pending.push(other),
            }
        }
        reader.consume(consumed);
    }
    sink.flush().await;
}

/// Accumulates one line of raw output and hands it to the channel.
struct LineSink {
    tx: mpsc::Sender<String>,
    pending: Vec<u8>,
    delivering: bool,
}

impl LineSink {
    fn new(tx: mpsc::Sender<String>) -> Self {
        Self {
            tx,
            pending: Vec::new(),
            delivering: true,
        }
    }

    async fn flush(&mut self) {
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        if !self.delivering || line.trim().is_empty() {
            return;
        }
        if self.tx.send(line).await.is_err() {
            self.delivering = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
