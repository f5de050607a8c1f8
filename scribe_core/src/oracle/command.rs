use std::env;
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::{CommentOracle, OracleError, OracleRequest, OracleResponse, OracleResult};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const PASSTHROUGH_ENV_PREFIX: &str = "SCRIBE_ORACLE_";

/// Oracle backed by an external program.
///
/// The program receives the request as JSON on stdin, including a rendered
/// `prompt`, and must print `{"text": "..."}` on stdout. It runs with a
/// cleared environment apart from `PATH`, `HOME` and `SCRIBE_ORACLE_*`.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    binary: OsString,
    args: Vec<OsString>,
    timeout: Duration,
    inherited_env: Vec<(OsString, OsString)>,
}

#[derive(Serialize)]
struct Payload<'a> {
    #[serde(flatten)]
    request: &'a OracleRequest,
    prompt: String,
}

impl CommandOracle {
    /// Run `binary` with `args`, waiting at most the default 60 seconds.
    pub fn new<I, S>(binary: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let inherited_env = env::vars_os()
            .filter(|(key, _)| {
                let key = key.to_string_lossy();
                key == "PATH" || key == "HOME" || key.starts_with(PASSTHROUGH_ENV_PREFIX)
            })
            .collect();
        Self {
            binary: binary.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            inherited_env,
        }
    }

    /// Override the deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exchange `payload` for the program's stdout. Every pipe is serviced
    /// by its own thread so the deadline also bounds a stalled stdin.
    fn run(&self, payload: Vec<u8>) -> OracleResult<String> {
        let mut command = Command::new(&self.binary);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .env_clear()
            .envs(self.inherited_env.iter().map(|(key, value)| (key, value)));

        let mut child = command.spawn().map_err(|err| {
            OracleError::unavailable(format!(
                "failed to spawn {}: {err}",
                self.binary.to_string_lossy()
            ))
        })?;

        let feeder = child
            .stdin
            .take()
            .map(|stdin| thread::spawn(move || feed(stdin, &payload)));
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                return Err(OracleError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
            Err(err) => {
                terminate(&mut child);
                return Err(OracleError::unavailable(format!(
                    "failed waiting on oracle: {err}"
                )));
            }
        };

        settle(feeder, "stdin")?;
        let stdout = settle(stdout, "stdout")?;
        let stderr = settle(stderr, "stderr")?;

        if !status.success() {
            let code = status
                .code()
                .map_or_else(|| "terminated".to_owned(), |code| code.to_string());
            return Err(OracleError::unavailable(format!(
                "oracle failed with status {code}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

impl CommentOracle for CommandOracle {
    fn id(&self) -> &'static str {
        "command"
    }

    fn generate(&self, request: &OracleRequest) -> OracleResult<OracleResponse> {
        let payload = serde_json::to_vec(&Payload {
            request,
            prompt: request.prompt(),
        })
        .map_err(|err| OracleError::malformed(format!("failed to encode request: {err}")))?;

        debug!(
            binary = %self.binary.to_string_lossy(),
            name = %request.context.name,
            "invoking oracle"
        );
        let stdout = self.run(payload)?;
        parse_response(&stdout)
    }
}

fn parse_response(stdout: &str) -> OracleResult<OracleResponse> {
    let response: OracleResponse = serde_json::from_str(stdout.trim())
        .map_err(|err| OracleError::malformed(format!("expected {{\"text\": ...}}: {err}")))?;
    if response.text.trim().is_empty() {
        return Err(OracleError::malformed("oracle returned empty text"));
    }
    Ok(OracleResponse::new(response.text.trim()))
}

/// Write the request and close stdin. A program that exits without reading
/// everything is judged by its exit status, not by the broken pipe.
fn feed(mut stdin: ChildStdin, payload: &[u8]) -> io::Result<()> {
    match stdin.write_all(payload) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || -> io::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

// Pipe threads are left detached; killing the child closes their ends.
fn terminate(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(error = %err, "oracle already exited");
    }
    if let Err(err) = child.wait() {
        warn!(error = %err, "failed to reap oracle");
    }
}

fn settle<T: Default>(
    handle: Option<JoinHandle<io::Result<T>>>,
    stream: &str,
) -> OracleResult<T> {
    let Some(handle) = handle else {
        return Ok(T::default());
    };
    handle
        .join()
        .map_err(|_| OracleError::unavailable(format!("oracle {stream} thread panicked")))?
        .map_err(|err| OracleError::unavailable(format!("oracle {stream} failed: {err}")))
}
