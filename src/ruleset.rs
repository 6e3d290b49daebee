//! Ruleset construction.
//!
//! Turns a [`PolicyRequest`] and a [`CapabilityProfile`] into a populated
//! kernel ruleset. The handle is owned by [`Ruleset`] and closed when it is
//! dropped, so every early return releases it.

use crate::capability::CapabilityProfile;
use crate::error::{KernelError, SandboxError};
use crate::path_check::open_rule_target;
use crate::request::PolicyRequest;
use crate::sys::{PolicyEngine, RulesetAttr};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

/// A kernel ruleset being populated.
///
/// Not `Clone`: exactly one handle exists per run, and sealing consumes it.
#[derive(Debug)]
pub struct Ruleset {
    fd: OwnedFd,
    attr: RulesetAttr,
    rules: usize,
}

impl Ruleset {
    /// Rights this ruleset declared as handled.
    pub fn attr(&self) -> RulesetAttr {
        self.attr
    }

    /// Number of rules registered so far.
    pub fn rule_count(&self) -> usize {
        self.rules
    }
}

impl AsFd for Ruleset {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

/// Create a ruleset and register every directive of the request.
///
/// Filesystem directives are registered first, then network directives, each
/// in request order. Each filesystem target is opened, type-checked, and
/// closed within its own registration step.
///
/// # Errors
///
/// - `ResourceError` if a path cannot be opened or has the wrong type
/// - `KernelError` if ruleset creation or a rule registration is refused
pub fn build_ruleset<E: PolicyEngine + ?Sized>(
    engine: &E,
    request: &PolicyRequest,
    profile: &CapabilityProfile,
) -> Result<Ruleset, SandboxError> {
    let toggles = request.toggles();
    let attr = RulesetAttr {
        handled_access_fs: if toggles.filesystem {
            profile.fs_access.bits()
        } else {
            0
        },
        handled_access_net: if toggles.network {
            profile.net_access.bits()
        } else {
            0
        },
    };

    let fd = engine
        .create_ruleset(&attr)
        .map_err(|source| KernelError::CreateRuleset { source })?;
    let mut ruleset = Ruleset { fd, attr, rules: 0 };

    for (path, scope, rights) in request.filesystem_rules() {
        let allowed = rights.to_fs_access(scope).intersection(attr.handled_fs());
        let target = open_rule_target(path, scope)?;

        engine
            .add_path_beneath(ruleset.as_fd(), target.as_fd(), allowed)
            .map_err(|source| KernelError::AddPathRule {
                path: path.to_path_buf(),
                source,
            })?;
        drop(target);

        ruleset.rules += 1;
        tracing::debug!(path = %path.display(), ?scope, ?allowed, "Added filesystem rule");
    }

    for (port, direction) in request.network_rules() {
        let allowed = direction.access();
        engine
            .add_net_port(ruleset.as_fd(), port, allowed)
            .map_err(|source| KernelError::AddPortRule { port, source })?;

        ruleset.rules += 1;
        tracing::debug!(port, ?direction, "Added network rule");
    }

    Ok(ruleset)
}
