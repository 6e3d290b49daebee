//! Landlock system call interface.
//!
//! `PolicyEngine` is the seam between policy compilation and the kernel. The
//! production implementation, [`Landlock`], issues the three Landlock syscalls
//! directly; tests substitute a recording engine.

use crate::access::{AccessFs, AccessNet, RestrictFlags};
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

/// `LANDLOCK_CREATE_RULESET_VERSION`
const CREATE_RULESET_VERSION: libc::c_uint = 1 << 0;

/// `LANDLOCK_RULE_PATH_BENEATH`
const RULE_PATH_BENEATH: libc::c_int = 1;

/// `LANDLOCK_RULE_NET_PORT`
const RULE_NET_PORT: libc::c_int = 2;

/// `struct landlock_ruleset_attr`, limited to the fields this tool sets.
///
/// The kernel accepts a shorter struct than its own as long as it is a prefix.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RulesetAttr {
    pub handled_access_fs: u64,
    pub handled_access_net: u64,
}

impl RulesetAttr {
    pub fn handled_fs(&self) -> AccessFs {
        AccessFs::from_bits_truncate(self.handled_access_fs)
    }

    pub fn handled_net(&self) -> AccessNet {
        AccessNet::from_bits_truncate(self.handled_access_net)
    }
}

/// `struct landlock_path_beneath_attr`
#[repr(C, packed)]
struct PathBeneathAttr {
    allowed_access: u64,
    parent_fd: i32,
}

/// `struct landlock_net_port_attr`
#[repr(C)]
struct NetPortAttr {
    allowed_access: u64,
    port: u64,
}

/// Kernel policy-engine operations used by the pipeline.
///
/// Every method maps to exactly one system call and reports failure as the
/// raw OS error, so callers can classify errno values.
pub trait PolicyEngine {
    /// Report the supported ABI version.
    fn abi_version(&self) -> io::Result<i32>;

    /// Create a ruleset handling the given rights.
    fn create_ruleset(&self, attr: &RulesetAttr) -> io::Result<OwnedFd>;

    /// Allow `allowed` on the hierarchy (or file) referred to by `parent`.
    fn add_path_beneath(
        &self,
        ruleset: BorrowedFd<'_>,
        parent: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()>;

    /// Allow `allowed` on a TCP port.
    fn add_net_port(&self, ruleset: BorrowedFd<'_>, port: u16, allowed: AccessNet)
        -> io::Result<()>;

    /// Enforce the ruleset on the calling process.
    fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictFlags) -> io::Result<()>;
}

impl<E: PolicyEngine + ?Sized> PolicyEngine for &E {
    fn abi_version(&self) -> io::Result<i32> {
        (**self).abi_version()
    }

    fn create_ruleset(&self, attr: &RulesetAttr) -> io::Result<OwnedFd> {
        (**self).create_ruleset(attr)
    }

    fn add_path_beneath(
        &self,
        ruleset: BorrowedFd<'_>,
        parent: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()> {
        (**self).add_path_beneath(ruleset, parent, allowed)
    }

    fn add_net_port(
        &self,
        ruleset: BorrowedFd<'_>,
        port: u16,
        allowed: AccessNet,
    ) -> io::Result<()> {
        (**self).add_net_port(ruleset, port, allowed)
    }

    fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictFlags) -> io::Result<()> {
        (**self).restrict_self(ruleset, flags)
    }
}

/// The running kernel's Landlock LSM.
#[derive(Debug, Clone, Copy, Default)]
pub struct Landlock;

fn check(ret: libc::c_long) -> io::Result<libc::c_long> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

impl PolicyEngine for Landlock {
    fn abi_version(&self) -> io::Result<i32> {
        // SAFETY: a null attribute with size 0 is the documented version query.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                std::ptr::null::<RulesetAttr>(),
                0usize,
                CREATE_RULESET_VERSION,
            )
        };
        check(ret).map(|abi| abi as i32)
    }

    fn create_ruleset(&self, attr: &RulesetAttr) -> io::Result<OwnedFd> {
        // SAFETY: attr points to a live, correctly sized struct.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                attr as *const RulesetAttr,
                std::mem::size_of::<RulesetAttr>(),
                0 as libc::c_uint,
            )
        };
        let fd = check(ret)? as RawFd;
        // SAFETY: the kernel returned a fresh descriptor that nothing else owns.
        Ok(unsafe { OwnedFd::from_raw_fd(fd) })
    }

    fn add_path_beneath(
        &self,
        ruleset: BorrowedFd<'_>,
        parent: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()> {
        let attr = PathBeneathAttr {
            allowed_access: allowed.bits(),
            parent_fd: parent.as_raw_fd(),
        };
        // SAFETY: both descriptors are borrowed for the duration of the call.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_add_rule,
                ruleset.as_raw_fd(),
                RULE_PATH_BENEATH,
                &attr as *const PathBeneathAttr,
                0 as libc::c_uint,
            )
        };
        check(ret).map(drop)
    }

    fn add_net_port(
        &self,
        ruleset: BorrowedFd<'_>,
        port: u16,
        allowed: AccessNet,
    ) -> io::Result<()> {
        let attr = NetPortAttr {
            allowed_access: allowed.bits(),
            port: u64::from(port),
        };
        // SAFETY: see add_path_beneath.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_add_rule,
                ruleset.as_raw_fd(),
                RULE_NET_PORT,
                &attr as *const NetPortAttr,
                0 as libc::c_uint,
            )
        };
        check(ret).map(drop)
    }

    fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictFlags) -> io::Result<()> {
        // SAFETY: the ruleset descriptor is borrowed for the duration of the call.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_restrict_self,
                ruleset.as_raw_fd(),
                flags.bits() as libc::c_uint,
            )
        };
        check(ret).map(drop)
    }
}

/// Set `PR_SET_NO_NEW_PRIVS`, without which `restrict_self` is refused.
pub fn set_no_new_privs() -> io::Result<()> {
    // SAFETY: prctl with integer arguments only.
    let ret = unsafe {
        libc::prctl(
            libc::PR_SET_NO_NEW_PRIVS,
            1 as libc::c_ulong,
            0 as libc::c_ulong,
            0 as libc::c_ulong,
            0 as libc::c_ulong,
        )
    };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording engine for unit tests.

    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Probe,
        CreateRuleset(RulesetAttr),
        AddPathBeneath { path: PathBuf, allowed: AccessFs },
        AddNetPort { port: u16, allowed: AccessNet },
        RestrictSelf(RestrictFlags),
    }

    /// Device and inode behind a descriptor number, or `None` once it is closed.
    pub fn file_id(fd: RawFd) -> Option<(u64, u64)> {
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fstat only writes into stat and fails with EBADF on a closed fd.
        if unsafe { libc::fstat(fd, stat.as_mut_ptr()) } != 0 {
            return None;
        }
        // SAFETY: fstat succeeded, so stat is initialized.
        let stat = unsafe { stat.assume_init() };
        Some((stat.st_dev as u64, stat.st_ino as u64))
    }

    /// Reports a fixed ABI and records every call instead of touching Landlock.
    #[derive(Debug)]
    pub struct FakeEngine {
        pub abi: Result<i32, i32>,
        pub fail_restrict: Option<i32>,
        pub calls: RefCell<Vec<Call>>,
        /// Every ruleset and rule-target descriptor seen, with its file identity.
        pub descriptors: RefCell<Vec<(RawFd, (u64, u64))>>,
    }

    impl FakeEngine {
        pub fn with_abi(abi: i32) -> Self {
            Self {
                abi: Ok(abi),
                fail_restrict: None,
                calls: RefCell::new(Vec::new()),
                descriptors: RefCell::new(Vec::new()),
            }
        }

        pub fn with_errno(errno: i32) -> Self {
            Self {
                abi: Err(errno),
                ..Self::with_abi(0)
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        /// Descriptors seen by the engine that still refer to the same file.
        pub fn leaked(&self) -> Vec<RawFd> {
            self.descriptors
                .borrow()
                .iter()
                .filter(|(fd, id)| file_id(*fd) == Some(*id))
                .map(|(fd, _)| *fd)
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }

        fn track(&self, fd: RawFd) {
            if let Some(id) = file_id(fd) {
                self.descriptors.borrow_mut().push((fd, id));
            }
        }
    }

    impl PolicyEngine for FakeEngine {
        fn abi_version(&self) -> io::Result<i32> {
            self.record(Call::Probe);
            self.abi.map_err(io::Error::from_raw_os_error)
        }

        fn create_ruleset(&self, attr: &RulesetAttr) -> io::Result<OwnedFd> {
            self.record(Call::CreateRuleset(*attr));
            // Anonymous file: a unique inode, so a reused fd number is never
            // mistaken for this ruleset
            let fd: OwnedFd = tempfile::tempfile()?.into();
            self.track(fd.as_raw_fd());
            Ok(fd)
        }

        fn add_path_beneath(
            &self,
            _ruleset: BorrowedFd<'_>,
            parent: BorrowedFd<'_>,
            allowed: AccessFs,
        ) -> io::Result<()> {
            let path = std::fs::read_link(format!("/proc/self/fd/{}", parent.as_raw_fd()))?;
            self.track(parent.as_raw_fd());
            self.record(Call::AddPathBeneath { path, allowed });
            Ok(())
        }

        fn add_net_port(
            &self,
            _ruleset: BorrowedFd<'_>,
            port: u16,
            allowed: AccessNet,
        ) -> io::Result<()> {
            self.record(Call::AddNetPort { port, allowed });
            Ok(())
        }

        fn restrict_self(&self, _ruleset: BorrowedFd<'_>, flags: RestrictFlags) -> io::Result<()> {
            self.record(Call::RestrictSelf(flags));
            match self.fail_restrict {
                Some(errno) => Err(io::Error::from_raw_os_error(errno)),
                None => Ok(()),
            }
        }
    }
}
