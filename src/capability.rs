//! Landlock ABI negotiation.
//!
//! The kernel reports a single ABI version. Everything version-dependent is
//! derived from it by [`CapabilityProfile::for_version`], which touches no
//! kernel state and can be tested on its own.

use crate::access::{AccessFs, AccessNet, RestrictFlags};
use crate::error::{CapabilityError, KernelError, SandboxError};
use crate::sys::PolicyEngine;

/// Oldest ABI this tool runs on. ABI 4 added TCP port rules.
pub const MIN_ABI: i32 = 4;

/// Newest ABI whose behavior this tool knows.
pub const NEWEST_KNOWN_ABI: i32 = 7;

/// What the running kernel supports, adjusted for version skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityProfile {
    /// ABI version reported by the kernel.
    pub abi: i32,

    /// Filesystem rights to declare as handled.
    pub fs_access: AccessFs,

    /// Network rights to declare as handled.
    pub net_access: AccessNet,

    /// Flags for `landlock_restrict_self`.
    pub restrict_flags: RestrictFlags,

    /// The ABI is newer than [`NEWEST_KNOWN_ABI`]; behavior falls back to the
    /// newest known version.
    pub newer_than_known: bool,
}

impl CapabilityProfile {
    /// Derive the effective masks for an ABI version.
    ///
    /// - ABI 4: `IOCTL_DEV` does not exist yet and is dropped, and so is
    ///   `LOG_NEW_EXEC_ON`
    /// - ABI 5 and 6: `LOG_NEW_EXEC_ON` is dropped
    /// - ABI 7 and later: everything requested is kept
    ///
    /// # Errors
    ///
    /// `CapabilityError::TooOld` below [`MIN_ABI`].
    pub fn for_version(abi: i32) -> Result<Self, CapabilityError> {
        if abi < MIN_ABI {
            return Err(CapabilityError::TooOld {
                required: MIN_ABI,
                actual: abi,
            });
        }

        let mut fs_access = AccessFs::ALL;
        let mut restrict_flags = RestrictFlags::LOG_NEW_EXEC_ON;

        if abi < 5 {
            fs_access = fs_access.difference(AccessFs::IOCTL_DEV);
        }
        if abi < 7 {
            restrict_flags = restrict_flags.difference(RestrictFlags::LOG_NEW_EXEC_ON);
        }

        Ok(Self {
            abi,
            fs_access,
            net_access: AccessNet::ALL,
            restrict_flags,
            newer_than_known: abi > NEWEST_KNOWN_ABI,
        })
    }

    /// Stop requesting denial logging after the next `execve`.
    pub fn without_exec_logging(mut self) -> Self {
        self.restrict_flags = self
            .restrict_flags
            .difference(RestrictFlags::LOG_NEW_EXEC_ON);
        self
    }
}

/// Probe the kernel and derive its capability profile.
///
/// # Errors
///
/// - `CapabilityError::Unsupported` on `ENOSYS`
/// - `CapabilityError::Disabled` on `EOPNOTSUPP`
/// - `CapabilityError::TooOld` below [`MIN_ABI`]
/// - `KernelError::Probe` for any other failure
pub fn resolve<E: PolicyEngine + ?Sized>(engine: &E) -> Result<CapabilityProfile, SandboxError> {
    let abi = engine.abi_version().map_err(|source| match source.raw_os_error() {
        Some(libc::ENOSYS) => SandboxError::from(CapabilityError::Unsupported),
        Some(libc::EOPNOTSUPP) => SandboxError::from(CapabilityError::Disabled),
        _ => SandboxError::from(KernelError::Probe { source }),
    })?;

    let profile = CapabilityProfile::for_version(abi)?;

    if profile.newer_than_known {
        tracing::warn!(
            abi,
            newest_known = NEWEST_KNOWN_ABI,
            "Landlock ABI version is newer than this tool was designed for. Some restrictions may not work as expected"
        );
    }

    tracing::debug!(
        abi,
        fs_access = ?profile.fs_access,
        restrict_flags = ?profile.restrict_flags,
        "Resolved Landlock capabilities"
    );

    Ok(profile)
}
