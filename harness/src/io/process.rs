//! Child process supervision shared by the compiler and solution runs.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run a command to completion, feeding `stdin` and capturing stdout/stderr.
///
/// stdout and stderr are drained on their own threads while the child runs, and
/// stdin is written from a third thread and then closed so the child sees end of
/// input. With `timeout` set the child is killed once it expires; with `None` the
/// call blocks until the child exits. `output_limit_bytes` bounds what is kept
/// in memory per stream (excess is drained and discarded).
///
/// On unix the child leads its own process group and a timeout kills the whole
/// group, so a grandchild holding the output pipes cannot keep this call
/// blocked. Elsewhere only the direct child is killed.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes = output_limit_bytes))]
pub fn run_command(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    debug!(program = ?cmd.get_program(), "spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, program = ?cmd.get_program(), "failed to spawn command");
            return Err(e).with_context(|| format!("spawn {:?}", cmd.get_program()));
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_limited(stderr, output_limit_bytes));

    let stdin_handle = match stdin {
        Some(input) => {
            let child_stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("stdin was not piped"))?;
            let input = input.to_vec();
            Some(thread::spawn(move || write_stdin(child_stdin, &input)))
        }
        None => None,
    };

    let mut timed_out = false;
    let status = match timeout {
        Some(timeout) => match child.wait_timeout(timeout).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing"
                );
                timed_out = true;
                kill_process_tree(&mut child)?;
                child.wait().context("wait command after kill")?
            }
        },
        None => child.wait().context("wait for command")?,
    };

    if let Some(handle) = stdin_handle {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(err = %err, "failed to write stdin"),
            Err(_) => return Err(anyhow!("stdin writer thread panicked")),
        }
    }
    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

/// SIGKILL the child's process group, then the child itself.
fn kill_process_tree(child: &mut Child) -> Result<()> {
    #[cfg(unix)]
    {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(exit_code = ?status.code(), "kill process group failed"),
            Err(err) => warn!(err = %err, "kill process group failed"),
        }
    }
    child.kill().context("kill command")
}

/// Write all of `input` and close the pipe.
///
/// A child that exits without reading its whole input closes the pipe early;
/// that is not an error here, its exit status decides the outcome.
fn write_stdin(mut child_stdin: ChildStdin, input: &[u8]) -> std::io::Result<()> {
    match child_stdin.write_all(input) {
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
