//! Capacity limits for parsed policies.

use crate::directive::Category;

/// Maximum number of directives accepted per category.
///
/// Real policies stay far below these; hitting one usually means a shell glob
/// expanded into the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleLimits {
    /// Maximum filesystem directives.
    ///
    /// Default: 1024.
    pub max_fs_rules: usize,

    /// Maximum network directives.
    ///
    /// Default: 1024.
    pub max_net_rules: usize,
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            max_fs_rules: 1024,
            max_net_rules: 1024,
        }
    }
}

impl RuleLimits {
    /// Set maximum filesystem directives.
    pub fn with_max_fs_rules(mut self, max: usize) -> Self {
        self.max_fs_rules = max;
        self
    }

    /// Set maximum network directives.
    pub fn with_max_net_rules(mut self, max: usize) -> Self {
        self.max_net_rules = max;
        self
    }

    /// The limit that applies to a category.
    pub fn max_for(&self, category: Category) -> usize {
        match category {
            Category::Filesystem => self.max_fs_rules,
            Category::Network => self.max_net_rules,
        }
    }
}
