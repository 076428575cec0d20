//! Running the IDL tool as a child process.
//!
//! The tool reports parse problems on stderr and through its exit status, so
//! a run is judged here and handed back as a [`CompileError`]. There is no
//! time limit unless one is configured.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::io::compiler::CompileError;

/// Bytes kept from one of the tool's streams, plus how many were discarded.
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    dropped: u64,
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }
}

/// Run the IDL tool described by `command` and judge its result.
///
/// Both streams are drained on reader threads so a chatty tool cannot stall
/// on a full pipe; each keeps at most `capture_limit` bytes. A non-zero exit
/// becomes [`CompileError::Parse`] carrying the tool's diagnostics.
#[instrument(skip_all, fields(program = ?command.get_program()))]
pub fn run_tool(
    mut command: Command,
    timeout: Option<Duration>,
    capture_limit: usize,
) -> Result<(), CompileError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|err| {
        error!(err = %err, "failed to start IDL compiler");
        CompileError::Launch(format!("{}: {err}", command.get_program().to_string_lossy()))
    })?;
    let stdout = child.stdout.take().map(|s| capture(s, capture_limit));
    let stderr = child.stderr.take().map(|s| capture(s, capture_limit));

    let status = wait_for(&mut child, timeout)?;
    let stdout = collect(stdout)?;
    let stderr = collect(stderr)?;
    debug!(exit_code = ?status.code(), "IDL compiler finished");

    if status.success() {
        return Ok(());
    }
    warn!(exit_code = ?status.code(), "IDL compiler failed");
    Err(CompileError::Parse {
        message: diagnostics(status, &stdout, &stderr),
    })
}

fn wait_for(child: &mut Child, timeout: Option<Duration>) -> Result<ExitStatus, CompileError> {
    let Some(limit) = timeout else {
        return Ok(child.wait()?);
    };
    if let Some(status) = child.wait_timeout(limit)? {
        return Ok(status);
    }
    warn!(timeout_secs = limit.as_secs(), "IDL compiler timed out, killing");
    child.kill()?;
    child.wait()?;
    Err(CompileError::TimedOut(limit))
}

fn capture<R: Read + Send + 'static>(stream: R, limit: usize) -> JoinHandle<io::Result<Captured>> {
    thread::spawn(move || {
        let mut captured = Captured::default();
        let mut kept = stream.take(limit as u64);
        kept.read_to_end(&mut captured.bytes)?;
        captured.dropped = io::copy(&mut kept.into_inner(), &mut io::sink())?;
        Ok(captured)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Captured>>>) -> Result<Captured, CompileError> {
    let Some(handle) = handle else {
        return Ok(Captured::default());
    };
    let captured = handle
        .join()
        .map_err(|_| CompileError::Launch("output reader thread panicked".to_string()))??;
    Ok(captured)
}

/// Best description of a failed run: stderr, else stdout, else the status.
fn diagnostics(status: ExitStatus, stdout: &Captured, stderr: &Captured) -> String {
    let (stream, captured) = if stderr.bytes.iter().any(|b| !b.is_ascii_whitespace()) {
        ("stderr", stderr)
    } else {
        ("stdout", stdout)
    };
    let mut message = captured.text();
    if message.is_empty() {
        return format!("IDL compiler exited with status {:?}", status.code());
    }
    if captured.dropped > 0 {
        message.push_str(&format!("\n[{stream} truncated {} bytes]", captured.dropped));
    }
    message
}
