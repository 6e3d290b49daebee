//! Parsed policy request.

use crate::access::AccessRights;
use crate::directive::{Category, Direction, Directive, Scope, ENABLE_FILESYSTEM, ENABLE_NETWORK};
use crate::error::PolicyError;
use crate::limits::RuleLimits;
use std::path::Path;

/// Which resource domains are sandboxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryToggles {
    pub filesystem: bool,
    pub network: bool,
}

impl CategoryToggles {
    /// Look for the enabling keywords anywhere in the token list.
    ///
    /// Position and repetition do not matter.
    pub fn scan<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut toggles = Self::default();
        for token in tokens {
            match token.as_ref() {
                ENABLE_FILESYSTEM => toggles.filesystem = true,
                ENABLE_NETWORK => toggles.network = true,
                _ => {}
            }
        }
        toggles
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Filesystem => self.filesystem,
            Category::Network => self.network,
        }
    }

    pub fn any(&self) -> bool {
        self.filesystem || self.network
    }
}

/// A validated policy: category toggles plus directives in command-line order.
///
/// Duplicate directives are kept; each becomes its own kernel rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    toggles: CategoryToggles,
    directives: Vec<Directive>,
    limits: RuleLimits,
    fs_count: usize,
    net_count: usize,
}

impl PolicyRequest {
    pub(crate) fn new(toggles: CategoryToggles, limits: RuleLimits) -> Self {
        Self {
            toggles,
            directives: Vec::new(),
            limits,
            fs_count: 0,
            net_count: 0,
        }
    }

    /// Append a directive, enforcing the per-category limit.
    pub(crate) fn push(&mut self, directive: Directive) -> Result<(), PolicyError> {
        let category = directive.category();
        let count = match category {
            Category::Filesystem => &mut self.fs_count,
            Category::Network => &mut self.net_count,
        };
        let max = self.limits.max_for(category);
        if *count >= max {
            return Err(PolicyError::TooManyRules { category, max });
        }
        *count += 1;
        self.directives.push(directive);
        Ok(())
    }

    pub fn toggles(&self) -> CategoryToggles {
        self.toggles
    }

    /// All directives in the order they were given.
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Filesystem directives in order.
    pub fn filesystem_rules(&self) -> impl Iterator<Item = (&Path, Scope, AccessRights)> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Filesystem {
                path,
                scope,
                rights,
            } => Some((path.as_path(), *scope, *rights)),
            Directive::Network { .. } => None,
        })
    }

    /// Network directives in order.
    pub fn network_rules(&self) -> impl Iterator<Item = (u16, Direction)> + '_ {
        self.directives.iter().filter_map(|d| match d {
            Directive::Network { port, direction } => Some((*port, *direction)),
            Directive::Filesystem { .. } => None,
        })
    }
}
