//! tokio-backed process runner with live output streaming

use super::{CommandSpec, Environment, ProcessRunner, RunnerError};
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Which output stream of the child a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Receives child output as it is produced
///
/// Chunks are delivered one line at a time (the final chunk may lack a
/// trailing newline). Implementations must tolerate calls from two tasks.
pub trait OutputSink: Send + Sync {
    fn on_output(&self, stream: OutputStream, chunk: &[u8]);
}

/// Forwards both child streams to this process' stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn on_output(&self, _stream: OutputStream, chunk: &[u8]) {
        let write = || {
            let mut stdout = std::io::stdout().lock();
            // A closed stdout must not abort the child
            let _ = stdout.write_all(chunk);
            let _ = stdout.flush();
        };
        // Blocking writes must not hold up other tasks on a worker thread
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(write)
            }
            _ => write(),
        }
    }
}

/// Runs commands as real subprocesses
///
/// There is no timeout: a child that never exits blocks the caller forever.
#[derive(Clone)]
pub struct SubprocessRunner {
    sink: Arc<dyn OutputSink>,
}

impl SubprocessRunner {
    /// Create a runner that streams to stdout
    pub fn new() -> Self {
        Self::with_sink(Arc::new(StdoutSink))
    }

    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubprocessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubprocessRunner").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        env: &Environment,
    ) -> Result<i32, RunnerError> {
        debug!("Spawning `{}` in {}", command, working_dir.display());

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(working_dir)
            .env_clear()
            .envs(env)
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match &command.stdout_file {
            Some(path) => {
                let path = working_dir.join(path);
                let file = std::fs::File::create(&path)
                    .map_err(|source| RunnerError::LogFile { path, source })?;
                cmd.stdout(Stdio::from(file));
            }
            None => {
                cmd.stdout(Stdio::piped());
            }
        }

        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        // Both streams are drained independently so a full pipe never stalls the child
        let mut readers: Vec<JoinHandle<std::io::Result<()>>> = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward(stdout, OutputStream::Stdout, self.sink.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward(stderr, OutputStream::Stderr, self.sink.clone())));
        }

        let status = child.wait().await.map_err(|source| RunnerError::Io {
            program: command.program.clone(),
            source,
        })?;

        for reader in readers {
            let result = reader
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
                .and_then(|r| r);
            if let Err(e) = result {
                warn!("Lost output from `{}`: {}", command.program, e);
            }
        }

        let code = status.code().unwrap_or_else(|| {
            warn!("`{}` was terminated by a signal", command.program);
            -1
        });
        debug!("`{}` exited with code {}", command.program, code);

        Ok(code)
    }
}

async fn forward<R>(reader: R, stream: OutputStream, sink: Arc<dyn OutputSink>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        sink.on_output(stream, &line);
    }
}
