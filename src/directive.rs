//! Directive vocabulary.
//!
//! Every verb the parser understands is one row of [`VERBS`]; adding a verb
//! means adding a row, not a branch.

use crate::access::{AccessNet, AccessRights};
use std::fmt;
use std::path::PathBuf;

/// Keyword enabling filesystem sandboxing.
pub const ENABLE_FILESYSTEM: &str = "ENABLE_FILESYSTEM_SANDBOXING";

/// Keyword enabling network sandboxing.
pub const ENABLE_NETWORK: &str = "ENABLE_NETWORK_SANDBOXING";

/// Resource domain a directive belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Filesystem,
    Network,
}

impl Category {
    /// The keyword that must be present before directives of this category
    /// are accepted.
    pub fn keyword(self) -> &'static str {
        match self {
            Category::Filesystem => ENABLE_FILESYSTEM,
            Category::Network => ENABLE_NETWORK,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Filesystem => write!(f, "filesystem"),
            Category::Network => write!(f, "network"),
        }
    }
}

/// What a filesystem directive's path must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A single regular file.
    File,
    /// A directory and everything beneath it.
    Subtree,
}

/// Direction of an allowed TCP port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Incoming: `bind(2)` on the port.
    Bind,
    /// Outgoing: `connect(2)` to the port.
    Connect,
}

impl Direction {
    pub fn access(self) -> AccessNet {
        match self {
            Direction::Bind => AccessNet::BIND_TCP,
            Direction::Connect => AccessNet::CONNECT_TCP,
        }
    }
}

/// One parsed permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Filesystem {
        path: PathBuf,
        scope: Scope,
        rights: AccessRights,
    },
    Network {
        port: u16,
        direction: Direction,
    },
}

impl Directive {
    pub fn category(&self) -> Category {
        match self {
            Directive::Filesystem { .. } => Category::Filesystem,
            Directive::Network { .. } => Category::Network,
        }
    }
}

/// What a verb produces once its payload is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbKind {
    Filesystem { scope: Scope, rights: AccessRights },
    Network(Direction),
}

/// A directive verb: the text before the `:` and what it grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verb {
    pub name: &'static str,
    pub kind: VerbKind,
}

impl Verb {
    const fn fs(name: &'static str, scope: Scope, rights: AccessRights) -> Self {
        Self {
            name,
            kind: VerbKind::Filesystem { scope, rights },
        }
    }

    const fn net(name: &'static str, direction: Direction) -> Self {
        Self {
            name,
            kind: VerbKind::Network(direction),
        }
    }

    pub fn category(&self) -> Category {
        match self.kind {
            VerbKind::Filesystem { .. } => Category::Filesystem,
            VerbKind::Network(_) => Category::Network,
        }
    }

    /// What the payload after `:` is expected to be.
    pub fn payload_name(&self) -> &'static str {
        match self.kind {
            VerbKind::Filesystem { .. } => "path",
            VerbKind::Network(_) => "port",
        }
    }
}

/// All recognized verbs.
pub const VERBS: &[Verb] = &[
    Verb::fs("FILE_READ", Scope::File, AccessRights::READ_ONLY),
    Verb::fs("FILE_EXEC", Scope::File, AccessRights::READ_EXEC),
    Verb::fs("FILE_WRITE", Scope::File, AccessRights::READ_WRITE),
    Verb::fs("FILE_EXEC_WRITE", Scope::File, AccessRights::READ_WRITE_EXEC),
    Verb::fs("FILE_WRITE_EXEC", Scope::File, AccessRights::READ_WRITE_EXEC),
    Verb::fs("PATH_BENEATH_READ", Scope::Subtree, AccessRights::READ_ONLY),
    Verb::fs("PATH_BENEATH_EXEC", Scope::Subtree, AccessRights::READ_EXEC),
    Verb::fs("PATH_BENEATH_WRITE", Scope::Subtree, AccessRights::READ_WRITE),
    Verb::fs("PATH_BENEATH_EXEC_WRITE", Scope::Subtree, AccessRights::READ_WRITE_EXEC),
    Verb::fs("PATH_BENEATH_WRITE_EXEC", Scope::Subtree, AccessRights::READ_WRITE_EXEC),
    Verb::net("ALLOW_INCOMING_TCP_PORT", Direction::Bind),
    Verb::net("ALLOW_OUTGOING_TCP_PORT", Direction::Connect),
];

/// Split a token into its verb and payload.
///
/// The verb ends at the first `:`, so payloads may themselves contain colons.
/// Matching is exact and case-sensitive.
pub fn lookup(token: &str) -> Option<(&'static Verb, &str)> {
    let (name, payload) = token.split_once(':')?;
    VERBS
        .iter()
        .find(|verb| verb.name == name)
        .map(|verb| (verb, payload))
}
