//! The program to run once the sandbox is sealed.
//!
//! `SealedCommand` is only created by [`Sandbox::apply`](crate::Sandbox::apply)
//! or [`Sandbox::enforce`](crate::Sandbox::enforce), after the ruleset is
//! enforced, so nothing can exec the target unrestricted.

use crate::error::ExecError;
use std::ffi::{OsStr, OsString};
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// Program and arguments following `--`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    /// Looked up in `PATH` when it contains no slash.
    pub program: OsString,

    /// Arguments, not including the program itself.
    pub args: Vec<OsString>,
}

impl TargetCommand {
    pub fn new(program: impl Into<OsString>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line into program and arguments.
    ///
    /// Returns `None` for an empty command line.
    pub fn from_argv(argv: Vec<OsString>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }
}

/// A target command whose process is already sandboxed.
#[derive(Debug)]
pub struct SealedCommand {
    pub(crate) command: TargetCommand,
    pub(crate) abi: i32,
}

impl SealedCommand {
    /// Replace the current process image with the target.
    ///
    /// Environment and open descriptors are inherited. Only returns on
    /// failure.
    pub fn exec(self) -> ExecError {
        tracing::debug!(
            program = %self.command.program.to_string_lossy(),
            args = self.command.args.len(),
            "Replacing process image"
        );

        let source = Command::new(&self.command.program)
            .args(&self.command.args)
            .exec();

        exec_error(&self.command.program, source)
    }

    /// The program that will be executed.
    pub fn program(&self) -> &OsStr {
        &self.command.program
    }

    /// The arguments.
    pub fn args(&self) -> &[OsString] {
        &self.command.args
    }

    /// Landlock ABI the restriction was negotiated against.
    pub fn abi(&self) -> i32 {
        self.abi
    }
}

fn exec_error(program: &OsStr, source: io::Error) -> ExecError {
    let command = program.to_string_lossy().into_owned();
    match source.kind() {
        io::ErrorKind::NotFound => ExecError::NotFound { command, source },
        _ => ExecError::Failed { command, source },
    }
}
