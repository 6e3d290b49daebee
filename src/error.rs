//! Error types for sst.
//!
//! Errors are grouped by who can fix them:
//! - [`ArgumentError`] and [`PolicyError`]: the caller, by changing the directives
//! - [`CapabilityError`]: the system owner, by changing the kernel or its config
//! - [`ResourceError`]: the caller or the filesystem, a path is missing or of the wrong type
//! - [`KernelError`]: the kernel refused an operation; never retried
//!
//! Every error is fatal for a run: either the complete policy is sealed before
//! the target starts, or the target never starts.

use crate::directive::Category;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed command line or directive token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// No `--` between the options and the command
    #[error("missing '--' separator in arguments")]
    MissingSeparator,

    /// Nothing after `--`
    #[error("no command specified after '--'")]
    MissingCommand,

    /// An option was the empty string
    #[error("there is an empty argument in the argument list (position {position})")]
    EmptyToken { position: usize },

    /// An option is not valid UTF-8
    #[error("argument at position {position} is not valid UTF-8: {lossy}")]
    InvalidUnicode { position: usize, lossy: String },

    /// Token matches no known verb or keyword
    #[error("unrecognized option: {token}")]
    Unrecognized { token: String },

    /// Verb with nothing after the colon
    #[error("{verb}: missing {expected}")]
    MissingPayload {
        verb: &'static str,
        expected: &'static str,
    },
}

/// Directive that is well-formed but not acceptable in this request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Directive used without its enabling keyword
    #[error("{verb} requires {keyword}")]
    CategoryDisabled {
        verb: &'static str,
        keyword: &'static str,
    },

    /// Port payload is not 1-5 digits in 0..=65535
    #[error("{verb}: invalid port '{payload}'")]
    InvalidPort { verb: &'static str, payload: String },

    /// More directives of one category than the configured limit
    #[error("too many {category} rules (limit {max})")]
    TooManyRules { category: Category, max: usize },

    /// Neither enabling keyword was given
    #[error("no sandboxing options given")]
    NothingEnabled,
}

/// The running kernel cannot enforce the policy at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// `ENOSYS`: the kernel has no Landlock support
    #[error("Landlock is not supported by the kernel (ENOSYS)")]
    Unsupported,

    /// `EOPNOTSUPP`: Landlock is built in but not enabled at boot
    #[error("Landlock is disabled in the kernel (EOPNOTSUPP)")]
    Disabled,

    /// ABI predates network rules
    #[error(
        "Landlock ABI version {actual} is too old; version {required} or later required for this tool"
    )]
    TooOld { required: i32, actual: i32 },
}

/// A directive's path cannot be used as a rule target.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("cannot open '{}' for sandboxing: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot invoke fstat on '{}': {source}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    /// `PATH_BENEATH_*` target is not a directory
    #[error("PATH_BENEATH_*: '{}' is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    /// `FILE_*` target is not a regular file
    #[error("FILE_*: '{}' is not a regular file", .path.display())]
    NotARegularFile { path: PathBuf },
}

/// The kernel rejected a Landlock or prctl operation.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("landlock_create_ruleset version probe failed: {source}")]
    Probe { source: io::Error },

    #[error("failed to create Landlock ruleset: {source}")]
    CreateRuleset { source: io::Error },

    #[error("failed to add filesystem rule for '{}': {source}", .path.display())]
    AddPathRule { path: PathBuf, source: io::Error },

    #[error("failed to add network rule for port {port}: {source}")]
    AddPortRule { port: u16, source: io::Error },

    #[error("failed to apply Landlock ruleset: {source}")]
    RestrictSelf { source: io::Error },

    #[error("prctl(PR_SET_NO_NEW_PRIVS) failed: {source}")]
    NoNewPrivs { source: io::Error },
}

impl KernelError {
    /// The underlying errno, if the OS reported one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            KernelError::Probe { source }
            | KernelError::CreateRuleset { source }
            | KernelError::AddPathRule { source, .. }
            | KernelError::AddPortRule { source, .. }
            | KernelError::RestrictSelf { source }
            | KernelError::NoNewPrivs { source } => source.raw_os_error(),
        }
    }
}

/// Replacing the process image with the target failed.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("command not found: {command}: {source}")]
    NotFound { command: String, source: io::Error },

    #[error("execvp '{command}' failed: {source}")]
    Failed { command: String, source: io::Error },
}

/// Combined error type for the parse-resolve-build-seal flow.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Kernel(#[from] KernelError),
}
