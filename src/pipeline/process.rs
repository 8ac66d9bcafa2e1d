// External tool invocation and child process supervision

use anyhow::{Context, Result};
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ForgeError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// An argv template for an external tool. `{name}` placeholders are replaced
/// per invocation; `{self}` is the running executable.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    tool: &'static str,
    argv: Vec<String>,
    self_exe: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(tool: &'static str, argv: &[String]) -> Result<Self> {
        match argv.first() {
            None => {
                return Err(ForgeError::InvalidToolCommand {
                    tool,
                    reason: "command is empty".to_string(),
                }
                .into());
            }
            Some(program) if program.trim().is_empty() => {
                return Err(ForgeError::InvalidToolCommand {
                    tool,
                    reason: "program name is empty".to_string(),
                }
                .into());
            }
            Some(_) => {}
        }

        let self_exe = if argv.iter().any(|a| a.contains("{self}")) {
            Some(std::env::current_exe().context("Could not locate the running executable")?)
        } else {
            None
        };

        Ok(Self {
            tool,
            argv: argv.to_vec(),
            self_exe,
        })
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    pub fn render(&self, vars: &[(&str, String)]) -> Vec<String> {
        let exe = self.self_exe.as_ref().map(|p| p.to_string_lossy().to_string());
        self.argv
            .iter()
            .map(|arg| substitute(arg, exe.as_deref(), vars))
            .collect()
    }

    pub fn spawn(&self, vars: &[(&str, String)]) -> Result<SupervisedProcess> {
        SupervisedProcess::spawn(&self.render(vars))
            .with_context(|| format!("Failed to start {}", self.tool))
    }
}

/// Fills in every placeholder in one pass, so substituted values are never
/// scanned again. Unknown `{...}` text is kept as is.
fn substitute(template: &str, self_exe: Option<&str>, vars: &[(&str, String)]) -> String {
    let lookup = |key: &str| {
        if key == "self" {
            return self_exe.map(str::to_string);
        }
        vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        match lookup(&after[..close]) {
            Some(value) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Terminate,
    Kill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Exited(ExitStatus),
    TimedOut,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ProcessOutcome::Exited(status) if status.success())
    }

    pub fn describe(&self) -> String {
        match self {
            ProcessOutcome::Exited(status) => describe_status(status),
            ProcessOutcome::TimedOut => "timed out".to_string(),
        }
    }
}

pub fn describe_status(status: &ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("exited with code {}", code)
    } else if let Some(signal) = status.signal() {
        format!("killed by signal {}", signal)
    } else {
        status.to_string()
    }
}

/// A running child process owned by exactly one supervisor.
#[derive(Debug)]
pub struct SupervisedProcess {
    child: Child,
}

impl SupervisedProcess {
    pub fn spawn(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| anyhow::anyhow!("Cannot spawn an empty command"))?;

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        Ok(Self { child })
    }

    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }

    /// Polls for exit until `timeout` elapses. `Ok(None)` means still running.
    pub fn wait_timeout(&mut self, timeout: Duration) -> io::Result<Option<ExitStatus>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn signal(&mut self, kind: Signal) -> io::Result<()> {
        match kind {
            Signal::Kill => self.child.kill(),
            Signal::Terminate => {
                // SAFETY: plain kill(2) on a pid we spawned and have not reaped yet.
                let rc = unsafe { libc::kill(self.child.id() as libc::pid_t, libc::SIGTERM) };
                if rc == 0 {
                    Ok(())
                } else {
                    Err(io::Error::last_os_error())
                }
            }
        }
    }

    /// Waits for the process, terminating it if `timeout` passes first.
    /// A process that ignores SIGTERM is killed after a short grace period.
    pub fn supervise(mut self, timeout: Option<Duration>) -> io::Result<ProcessOutcome> {
        let Some(timeout) = timeout else {
            return self.wait().map(ProcessOutcome::Exited);
        };

        if let Some(status) = self.wait_timeout(timeout)? {
            return Ok(ProcessOutcome::Exited(status));
        }

        self.signal(Signal::Terminate)?;
        if self.wait_timeout(TERMINATE_GRACE)?.is_none() {
            self.signal(Signal::Kill)?;
            self.wait()?;
        }
        Ok(ProcessOutcome::TimedOut)
    }
}
