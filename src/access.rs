//! Access-right bitmasks.
//!
//! The kernel-facing masks (`AccessFs`, `AccessNet`, `RestrictFlags`) mirror the
//! Landlock uapi values bit for bit. `AccessRights` is the abstract right set a
//! directive carries; it is translated to `AccessFs` once the target's scope is
//! known.

use crate::directive::Scope;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

macro_rules! mask {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $( $(#[$flag_meta:meta])* $flag:ident = $value:expr, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            $( $(#[$flag_meta])* pub const $flag: Self = Self($value); )*

            /// Every right this type knows about.
            pub const ALL: Self = Self(0 $( | $value )*);

            /// The empty set.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Build from raw bits, dropping unknown ones.
            pub const fn from_bits_truncate(bits: $repr) -> Self {
                Self(bits & Self::ALL.0)
            }

            /// Raw bits as passed to the kernel.
            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub const fn intersection(self, other: Self) -> Self {
                Self(self.0 & other.0)
            }

            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                *self = self.union(rhs);
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut first = true;
                write!(f, "{}(", stringify!($name))?;
                $(
                    if self.contains(Self::$flag) && Self::$flag.0 != 0 {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        f.write_str(stringify!($flag))?;
                        first = false;
                    }
                )*
                if first {
                    f.write_str("empty")?;
                }
                f.write_str(")")
            }
        }
    };
}

mask! {
    /// Filesystem rights handled by a Landlock ruleset (`LANDLOCK_ACCESS_FS_*`).
    AccessFs(u64) {
        EXECUTE = 1 << 0,
        WRITE_FILE = 1 << 1,
        READ_FILE = 1 << 2,
        READ_DIR = 1 << 3,
        REMOVE_DIR = 1 << 4,
        REMOVE_FILE = 1 << 5,
        MAKE_CHAR = 1 << 6,
        MAKE_DIR = 1 << 7,
        MAKE_REG = 1 << 8,
        MAKE_SOCK = 1 << 9,
        MAKE_FIFO = 1 << 10,
        MAKE_BLOCK = 1 << 11,
        MAKE_SYM = 1 << 12,
        /// ABI 2.
        REFER = 1 << 13,
        /// ABI 3.
        TRUNCATE = 1 << 14,
        /// ABI 5.
        IOCTL_DEV = 1 << 15,
    }
}

impl AccessFs {
    /// Rights the kernel accepts on a rule whose target is not a directory.
    pub const FILE: Self = Self(
        Self::EXECUTE.0
            | Self::WRITE_FILE.0
            | Self::READ_FILE.0
            | Self::TRUNCATE.0
            | Self::IOCTL_DEV.0,
    );
}

mask! {
    /// Network rights handled by a Landlock ruleset (`LANDLOCK_ACCESS_NET_*`, ABI 4).
    AccessNet(u64) {
        BIND_TCP = 1 << 0,
        CONNECT_TCP = 1 << 1,
    }
}

mask! {
    /// Flags for `landlock_restrict_self`.
    RestrictFlags(u32) {
        /// ABI 7: keep logging denials after the next `execve`.
        LOG_NEW_EXEC_ON = 1 << 1,
    }
}

mask! {
    /// Abstract rights carried by a filesystem directive.
    AccessRights(u8) {
        READ = 1 << 0,
        WRITE = 1 << 1,
        EXECUTE = 1 << 2,
        TRUNCATE = 1 << 3,
    }
}

impl AccessRights {
    pub const READ_ONLY: Self = Self::READ;
    pub const READ_EXEC: Self = Self(Self::READ.0 | Self::EXECUTE.0);
    pub const READ_WRITE: Self = Self(Self::READ.0 | Self::WRITE.0 | Self::TRUNCATE.0);
    pub const READ_WRITE_EXEC: Self = Self(Self::READ_WRITE.0 | Self::EXECUTE.0);

    /// Translate to the kernel mask for a target of the given scope.
    ///
    /// Reading a subtree also grants listing its directories; a single file
    /// never carries directory-only rights, which the kernel would reject.
    pub fn to_fs_access(self, scope: Scope) -> AccessFs {
        let mut access = AccessFs::empty();
        if self.contains(Self::READ) {
            access |= AccessFs::READ_FILE;
            if scope == Scope::Subtree {
                access |= AccessFs::READ_DIR;
            }
        }
        if self.contains(Self::WRITE) {
            access |= AccessFs::WRITE_FILE;
        }
        if self.contains(Self::EXECUTE) {
            access |= AccessFs::EXECUTE;
        }
        if self.contains(Self::TRUNCATE) {
            access |= AccessFs::TRUNCATE;
        }
        access
    }
}
