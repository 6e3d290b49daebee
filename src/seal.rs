//! Sealing a ruleset onto the calling process.
//!
//! There is no way back: once [`seal`] succeeds, this process, all of its
//! threads, and every program it later becomes are bound by the ruleset.

use crate::access::RestrictFlags;
use crate::error::KernelError;
use crate::ruleset::Ruleset;
use crate::sys::{set_no_new_privs, PolicyEngine};
use std::os::fd::AsFd;

/// Forbid the process from gaining privileges through `execve`.
///
/// Must run before [`seal`]; the kernel refuses to enforce a ruleset on a
/// process that could still gain privileges.
pub fn restrict_privileges() -> Result<(), KernelError> {
    set_no_new_privs().map_err(|source| KernelError::NoNewPrivs { source })
}

/// Enforce `ruleset` on the calling process.
///
/// The ruleset handle is closed before this returns, whatever the outcome.
///
/// # Errors
///
/// `KernelError::RestrictSelf` with the kernel's errno. A failed seal must
/// end the run: the target must never start unrestricted.
pub fn seal<E: PolicyEngine + ?Sized>(
    engine: &E,
    ruleset: Ruleset,
    flags: RestrictFlags,
) -> Result<(), KernelError> {
    let rules = ruleset.rule_count();
    let result = engine.restrict_self(ruleset.as_fd(), flags);
    drop(ruleset);

    result.map_err(|source| KernelError::RestrictSelf { source })?;

    tracing::info!(rules, ?flags, "Landlock ruleset enforced");
    Ok(())
}
