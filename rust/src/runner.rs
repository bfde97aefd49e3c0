use std::collections::HashMap;
use std::io;
use std::process::Stdio;

use futures::StreamExt;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use crate::args::{resolve_arguments, ArgumentSpec};
use crate::error::RunError;
use crate::input::{classify, InputKind};

const STREAM_EVENT_BUFFER: usize = 32;

/// Successful result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everything the child wrote to stdout.
    Output(String),
    /// The child finished without writing anything to stdout.
    Success,
}

impl Outcome {
    fn from_buffer(buffer: &[u8]) -> Self {
        if buffer.is_empty() {
            Self::Success
        } else {
            Self::Output(String::from_utf8_lossy(buffer).into_owned())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Output(text) => Some(text),
            Self::Success => None,
        }
    }

    pub fn is_success_flag(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn report(&self) -> RunReport {
        match self {
            Self::Output(text) => RunReport {
                ok: true,
                output: Some(text.clone()),
                success: None,
                error: None,
            },
            Self::Success => RunReport {
                ok: true,
                output: None,
                success: Some(true),
                error: None,
            },
        }
    }
}

/// Serializable view of a finished run, used for `--json` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn failure(err: &RunError) -> Self {
        Self {
            ok: false,
            output: None,
            success: None,
            error: Some(err.to_string()),
        }
    }
}

/// Whether the child's exit status takes part in deciding the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Only error-stream output counts as failure.
    #[default]
    IgnoreStatus,
    /// Also fail when the child exits unsuccessfully with a silent stderr.
    RequireSuccess,
}

#[derive(Debug, Clone)]
pub struct Invocation {
    executable: String,
    input: String,
    args: ArgumentSpec,
    envs: HashMap<String, String>,
    exit_policy: ExitPolicy,
}

impl Invocation {
    pub fn new(
        executable: impl Into<String>,
        input: impl Into<String>,
        args: impl Into<ArgumentSpec>,
    ) -> Self {
        Self {
            executable: executable.into(),
            input: input.into(),
            args: args.into(),
            envs: HashMap::new(),
            exit_policy: ExitPolicy::default(),
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    pub fn envs(mut self, envs: HashMap<String, String>) -> Self {
        self.envs.extend(envs);
        self
    }

    pub fn exit_policy(mut self, policy: ExitPolicy) -> Self {
        self.exit_policy = policy;
        self
    }

    pub async fn run(self) -> Result<Outcome, RunError> {
        let kind = classify(&self.input).await;
        let feeds_stdin = !self.input.is_empty() && kind == InputKind::LiteralData;
        let args = resolve_arguments(&self.input, kind, self.args);

        tracing::debug!(
            executable = %self.executable,
            input_kind = kind.as_str(),
            arg_count = args.len(),
            "spawning child process"
        );

        let mut child = Command::new(&self.executable)
            .args(&args)
            .envs(&self.envs)
            .stdin(if feeds_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        if feeds_stdin {
            let stdin = child
                .stdin
                .take()
                .ok_or_else(|| RunError::Io("child stdin was not piped".to_string()))?;
            tokio::spawn(feed_stdin(stdin, self.input));
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunError::Io("child stdout was not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunError::Io("child stderr was not piped".to_string()))?;

        let (tx, events) = mpsc::channel(STREAM_EVENT_BUFFER);
        tokio::spawn(forward_stream(stdout, ChildStream::Stdout, tx.clone()));
        tokio::spawn(forward_stream(stderr, ChildStream::Stderr, tx));

        let result = collect(events).await;

        match (result, self.exit_policy) {
            (Ok(outcome), ExitPolicy::RequireSuccess) => {
                let status = child
                    .wait()
                    .await
                    .map_err(|err| RunError::Io(format!("waiting for child: {err}")))?;
                tracing::debug!(executable = %self.executable, %status, "child exited");
                if status.success() {
                    Ok(outcome)
                } else {
                    Err(RunError::ExitStatus {
                        code: status.code(),
                    })
                }
            }
            (result, _) => {
                tokio::spawn(reap(child, self.executable));
                result
            }
        }
    }
}

/// Drives a [`Collector`] until the first terminal event.
///
/// Stdout end-of-data is terminal, but events already queued behind it are
/// folded in first so a stderr chunk that arrived before it still wins.
async fn collect(mut events: mpsc::Receiver<StreamEvent>) -> Result<Outcome, RunError> {
    let mut collector = Collector::new();
    while let Some(event) = events.recv().await {
        if matches!(event, StreamEvent::Closed(ChildStream::Stdout)) {
            tokio::task::yield_now().await;
            while let Ok(queued) = events.try_recv() {
                if let Some(terminal) = collector.on_event(queued) {
                    return terminal;
                }
            }
        }
        if let Some(terminal) = collector.on_event(event) {
            return terminal;
        }
    }
    Err(RunError::Io(
        "child output streams ended without closing".to_string(),
    ))
}

/// Runs `executable` with `input` and `args` using the default policy.
pub async fn run_command(
    executable: impl Into<String>,
    input: impl Into<String>,
    args: impl Into<ArgumentSpec>,
) -> Result<Outcome, RunError> {
    Invocation::new(executable, input, args).run().await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildStream {
    Stdout,
    Stderr,
}

impl ChildStream {
    fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

#[derive(Debug)]
enum StreamEvent {
    Chunk(ChildStream, Vec<u8>),
    Closed(ChildStream),
    ReadFailed(ChildStream, io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Reading,
    Resolved,
    Failed,
}

/// Folds stream events into a single result.
///
/// The first stderr chunk fails the run and stdout end-of-data resolves it,
/// whichever comes first. After the terminal result has been handed out
/// every further event is ignored.
struct Collector {
    state: RunState,
    output: Vec<u8>,
}

impl Collector {
    fn new() -> Self {
        Self {
            state: RunState::Reading,
            output: Vec::new(),
        }
    }

    fn on_event(&mut self, event: StreamEvent) -> Option<Result<Outcome, RunError>> {
        if self.state != RunState::Reading {
            return None;
        }

        match event {
            StreamEvent::Chunk(ChildStream::Stdout, bytes) => {
                self.output.extend_from_slice(&bytes);
                None
            }
            StreamEvent::Chunk(ChildStream::Stderr, bytes) => {
                self.state = RunState::Failed;
                Some(Err(RunError::ChildReported(
                    String::from_utf8_lossy(&bytes).into_owned(),
                )))
            }
            StreamEvent::ReadFailed(stream, err) => {
                self.state = RunState::Failed;
                Some(Err(RunError::Io(format!(
                    "reading child {}: {err}",
                    stream.as_str()
                ))))
            }
            StreamEvent::Closed(ChildStream::Stdout) => {
                self.state = RunState::Resolved;
                let outcome = Outcome::from_buffer(&self.output);
                self.output.clear();
                Some(Ok(outcome))
            }
            StreamEvent::Closed(ChildStream::Stderr) => None,
        }
    }
}

async fn forward_stream<R>(reader: R, stream: ChildStream, tx: mpsc::Sender<StreamEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut chunks = ReaderStream::new(reader);
    while let Some(chunk) = chunks.next().await {
        let event = match chunk {
            Ok(bytes) => StreamEvent::Chunk(stream, bytes.to_vec()),
            Err(err) => {
                let _ = tx.send(StreamEvent::ReadFailed(stream, err)).await;
                return;
            }
        };
        if tx.send(event).await.is_err() {
            return;
        }
    }
    let _ = tx.send(StreamEvent::Closed(stream)).await;
}

async fn feed_stdin(mut stdin: ChildStdin, payload: String) {
    let written = match stdin.write_all(payload.as_bytes()).await {
        Ok(()) => stdin.shutdown().await,
        Err(err) => Err(err),
    };
    match written {
        Ok(()) => tracing::debug!(bytes = payload.len(), "wrote input to child stdin"),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("child closed stdin before reading all input");
        }
        Err(err) => tracing::warn!("Failed to write input to child stdin: {err}"),
    }
}

async fn reap(mut child: Child, executable: String) {
    match child.wait().await {
        Ok(status) => tracing::debug!(executable = %executable, %status, "child exited"),
        Err(err) => tracing::warn!("Failed to wait for '{executable}': {err}"),
    }
}
