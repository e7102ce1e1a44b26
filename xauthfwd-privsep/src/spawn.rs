//! Running a tool under a dropped identity.

use std::ffi::{OsStr, OsString};
use std::io::{self, Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::error::RunError;
use crate::platform;
use crate::wait::ExitStatus;

/// First descriptor the child must not inherit.
const FIRST_PRIVATE_FD: libc::c_int = libc::STDERR_FILENO + 1;

/// Specification for running a child process under a given identity.
pub struct SpawnSpec {
    /// Program to execute (a path, or a command name looked up in PATH).
    pub program: PathBuf,
    /// Arguments, not including argv[0].
    pub args: Vec<OsString>,
    /// User id the child runs as.
    pub uid: u32,
    /// Primary group id the child runs as.
    pub gid: u32,
    /// Bytes fed to the child's standard input before it is closed.
    pub input: Option<Vec<u8>>,
}

impl SpawnSpec {
    /// Create a new SpawnSpec running `program` as `uid`/`gid`.
    pub fn new(program: impl Into<PathBuf>, uid: u32, gid: u32) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            uid,
            gid,
            input: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the bytes written to the child's standard input.
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    fn validate(&self) -> Result<(), RunError> {
        let program = self.program.as_os_str().as_bytes();
        if program.is_empty() {
            return Err(RunError::InvalidArgument("empty program".to_string()));
        }
        if program.contains(&0) {
            return Err(RunError::InvalidArgument(format!(
                "program contains a nul byte: {}",
                self.program.display()
            )));
        }
        if let Some(arg) = self.args.iter().find(|a| a.as_bytes().contains(&0)) {
            return Err(RunError::InvalidArgument(format!(
                "argument contains a nul byte: {}",
                arg.to_string_lossy()
            )));
        }
        Ok(())
    }
}

/// Captured result of a finished child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Everything the child wrote to standard output.
    pub stdout: Vec<u8>,
    /// How the child terminated. Callers may ignore it.
    pub status: ExitStatus,
}

/// Run a child process under `spec.uid`/`spec.gid` and capture its output.
///
/// The child:
/// 1. Gets pipes as stdin and stdout, and `/dev/null` as stderr
/// 2. Sets its group id, clears supplementary groups (when started by
///    root), then sets its user id
/// 3. Marks every descriptor above stderr close-on-exec, so only the two
///    pipes survive exec
/// 4. Execs `spec.program`
///
/// The parent writes `spec.input` (if any), closes the child's stdin,
/// reads stdout until end-of-stream and reaps the child before returning.
/// There is no timeout: a child that never closes stdout blocks the caller.
pub fn run(spec: SpawnSpec) -> Result<RunOutput, RunError> {
    spec.validate()?;

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .gid(spec.gid)
        .uid(spec.uid);

    // SAFETY: the hook only issues close_range/fcntl, which are
    // async-signal-safe, and allocates nothing.
    unsafe {
        command.pre_exec(|| platform::set_cloexec_from(FIRST_PRIVATE_FD));
    }

    let mut child = command.spawn().map_err(RunError::Spawn)?;

    tracing::trace!(
        pid = child.id(),
        uid = spec.uid,
        gid = spec.gid,
        program = %spec.program.display(),
        "child process spawned"
    );

    // Dropping the handle closes the pipe and signals end-of-input.
    if let Some(mut stdin) = child.stdin.take() {
        if let Some(input) = spec.input.as_deref() {
            if let Err(e) = stdin.write_all(input) {
                tracing::debug!(error = %e, "child did not consume its input");
            }
        }
    }

    let stdout = match read_output(&mut child) {
        Ok(stdout) => stdout,
        Err(e) => {
            // Never leave the child unreaped.
            let _ = child.wait();
            return Err(RunError::Read(e));
        }
    };

    let status = child.wait().map_err(RunError::Wait)?;

    Ok(RunOutput {
        stdout,
        status: status.into(),
    })
}

fn read_output(child: &mut Child) -> io::Result<Vec<u8>> {
    let mut output = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_end(&mut output)?;
    }
    Ok(output)
}
