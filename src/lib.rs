//! # sst
//!
//! Simple Sandboxer Tool: run a program under a Linux Landlock policy.
//!
//! `sst` compiles an allowlist of directives into a Landlock ruleset, enforces
//! it on the calling process, and then replaces itself with the target
//! program, which inherits the restriction for the rest of its life.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sst::{restrict_privileges, Sandbox, TargetCommand};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! restrict_privileges()?;
//!
//! let sandbox = Sandbox::builder().build();
//! let sealed = sandbox.apply(
//!     &[
//!         "ENABLE_FILESYSTEM_SANDBOXING",
//!         "PATH_BENEATH_EXEC:/usr",
//!         "FILE_READ:/etc/hosts",
//!         "ENABLE_NETWORK_SANDBOXING",
//!         "ALLOW_OUTGOING_TCP_PORT:443",
//!     ],
//!     TargetCommand::new("curl", vec!["https://example.com".into()]),
//! )?;
//!
//! // Only returns on failure
//! Err(sealed.exec().into())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Parse**: option tokens become a [`PolicyRequest`]; no kernel access
//! 2. **Resolve**: the kernel's Landlock ABI becomes a [`CapabilityProfile`]
//! 3. **Build**: each path is opened, type-checked, and registered on a [`Ruleset`]
//! 4. **Seal**: the ruleset is enforced and a [`SealedCommand`] is returned
//!
//! ## Design Principles
//!
//! - **Allowlist-only**: once a category is enabled, everything not listed is denied
//! - **Fail closed**: any error stops the run before the target starts
//! - **No way back**: there is no unseal; descendants stay restricted
//! - **Type-safe API**: only `SealedCommand` can exec the target

#[cfg(not(target_os = "linux"))]
compile_error!(
    "sst only supports Linux. \
     Landlock is a Linux Security Module; other platforms have no equivalent \
     that can be applied by an unprivileged process to itself."
);

mod access;
mod capability;
mod cli;
mod command;
mod directive;
mod error;
mod limits;
mod parser;
mod path_check;
mod request;
mod ruleset;
mod sandbox;
mod seal;
mod sys;

// Public API
pub use access::{AccessFs, AccessNet, AccessRights, RestrictFlags};
pub use capability::{resolve, CapabilityProfile, MIN_ABI, NEWEST_KNOWN_ABI};
pub use cli::{parse_invocation, Invocation, HELP};
pub use command::{SealedCommand, TargetCommand};
pub use directive::{
    lookup, Category, Direction, Directive, Scope, Verb, VerbKind, ENABLE_FILESYSTEM,
    ENABLE_NETWORK, VERBS,
};
pub use error::{
    ArgumentError, CapabilityError, ExecError, KernelError, PolicyError, ResourceError,
    SandboxError,
};
pub use limits::RuleLimits;
pub use parser::{parse_directives, parse_port};
pub use path_check::open_rule_target;
pub use request::{CategoryToggles, PolicyRequest};
pub use ruleset::{build_ruleset, Ruleset};
pub use sandbox::{Sandbox, SandboxBuilder};
pub use seal::{restrict_privileges, seal};
pub use sys::{Landlock, PolicyEngine, RulesetAttr};
