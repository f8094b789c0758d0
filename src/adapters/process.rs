//! Process runner - executes one external command and captures its output
//!
//! The runner never returns an error: spawn failures, timeouts and
//! cancellation all come back as a [`ProcessOutput`] for the caller to judge.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::core::models::{ProcessOutput, RunOptions};

/// How long to wait for output pipes to drain once the process is gone
const IO_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

enum Outcome {
    Exited(Option<i32>),
    WaitFailed(std::io::Error),
    TimedOut(Duration),
    Cancelled,
}

/// Run `command` with `args` and capture everything it prints
///
/// Unless `options.silent` is set, the command line is echoed and output is
/// mirrored to the console as it arrives. On timeout or cancellation the whole
/// process group is killed.
pub async fn run(command: &str, args: &[String], options: &RunOptions) -> ProcessOutput {
    if !options.silent {
        println!("$ {}", command_line(command, args));
    }

    let mut cmd = Command::new(command);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    own_process_group(&mut cmd);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!("Failed to spawn {command}: {e}");
            return ProcessOutput::spawn_failure(command, &e.to_string());
        },
    };

    // `id()` is gone once the child is reaped; the group outlives it
    let group = child.id();
    let mirror = !options.silent;
    let stdout = Capture::start(child.stdout.take(), Stream::Stdout, mirror);
    let stderr = Capture::start(child.stderr.take(), Stream::Stderr, mirror);

    let outcome = wait(&mut child, group, options).await;
    if matches!(outcome, Outcome::Exited(_)) {
        // Background jobs left behind would hold the pipes open
        kill_leftovers(group);
    }
    let (stdout, mut stderr) = tokio::join!(stdout.finish(), stderr.finish());

    match outcome {
        Outcome::Exited(code) => ProcessOutput::exited(code, stdout, stderr),
        Outcome::WaitFailed(e) => {
            append_line(&mut stderr, &format!("failed waiting for {command}: {e}"));
            ProcessOutput {
                stdout,
                stderr,
                ..ProcessOutput::default()
            }
        },
        Outcome::TimedOut(limit) => {
            append_line(&mut stderr, &format!("{command} timed out after {}s", limit.as_secs()));
            ProcessOutput {
                stdout,
                stderr,
                timed_out: true,
                ..ProcessOutput::default()
            }
        },
        Outcome::Cancelled => ProcessOutput {
            stdout,
            stderr,
            cancelled: true,
            ..ProcessOutput::default()
        },
    }
}

/// Render a command line for display, quoting arguments that contain spaces
#[must_use]
pub fn command_line(command: &str, args: &[String]) -> String {
    std::iter::once(command.to_string())
        .chain(args.iter().map(|a| {
            if a.is_empty() || a.contains(char::is_whitespace) {
                format!("'{a}'")
            } else {
                a.clone()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn wait(child: &mut Child, group: Option<u32>, options: &RunOptions) -> Outcome {
    let limit = options.timeout;
    let deadline = async move {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => Outcome::Exited(status.code()),
            Err(e) => Outcome::WaitFailed(e),
        },
        () = deadline => {
            warn!("Process timed out; killing");
            kill_tree(child, group).await;
            Outcome::TimedOut(limit.unwrap_or_default())
        }
        () = options.cancel.cancelled() => {
            debug!("Cancellation requested; killing process");
            kill_tree(child, group).await;
            Outcome::Cancelled
        }
    }
}

async fn kill_tree(child: &mut Child, group: Option<u32>) {
    if let Err(e) = signal_process_group(group) {
        warn!("Failed to kill process group: {e}");
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to kill process: {e}");
    }
}

#[cfg(unix)]
fn own_process_group(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(not(unix))]
const fn own_process_group(_cmd: &mut Command) {}

/// Kill whatever is still running in the group of an exited command
fn kill_leftovers(group: Option<u32>) {
    match signal_process_group(group) {
        Ok(true) => debug!("Killed background processes left by the command"),
        Ok(false) => {},
        Err(e) => warn!("Failed to kill leftover processes: {e}"),
    }
}

/// SIGKILL the process group led by `group`; `Ok(false)` when it is already empty
#[cfg(unix)]
fn signal_process_group(group: Option<u32>) -> Result<bool, nix::Error> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return Ok(false);
    };
    match killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn signal_process_group(_group: Option<u32>) -> Result<bool, std::io::Error> {
    Ok(false)
}

/// One output stream being read in the background
///
/// Lines land in a shared buffer as they arrive, so whatever was read is kept
/// even if the reader has to be abandoned.
struct Capture {
    stream: Stream,
    buffer: Arc<Mutex<String>>,
    reader: Option<JoinHandle<()>>,
}

impl Capture {
    fn start<R>(pipe: Option<R>, stream: Stream, mirror: bool) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(String::new()));
        let reader = pipe.map(|pipe| tokio::spawn(read_lines(pipe, stream, mirror, Arc::clone(&buffer))));
        Self { stream, buffer, reader }
    }

    async fn finish(self) -> String {
        if let Some(mut reader) = self.reader {
            match tokio::time::timeout(IO_CAPTURE_TIMEOUT, &mut reader).await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => warn!("{:?} capture task failed: {e}", self.stream),
                Err(_) => {
                    warn!("{:?} still open after the process ended; keeping partial output", self.stream);
                    reader.abort();
                },
            }
        }
        std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

async fn read_lines<R>(pipe: R, stream: Stream, mirror: bool, buffer: Arc<Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let chunk = String::from_utf8_lossy(&buf);
                if mirror {
                    match stream {
                        Stream::Stdout => print!("{chunk}"),
                        Stream::Stderr => eprint!("{chunk}"),
                    }
                }
                buffer.lock().unwrap_or_else(PoisonError::into_inner).push_str(&chunk);
            },
            Err(e) => {
                debug!("{stream:?} read failed: {e}");
                break;
            },
        }
    }
}

fn append_line(text: &mut String, line: &str) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');
}
