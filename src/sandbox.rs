//! Sandbox pipeline.
//!
//! The main entry point for sst. A `Sandbox` runs the four stages in order:
//! parse directives, resolve kernel capabilities, build the ruleset, seal it.

use crate::capability::{self, CapabilityProfile};
use crate::command::{SealedCommand, TargetCommand};
use crate::error::SandboxError;
use crate::limits::RuleLimits;
use crate::parser::parse_directives;
use crate::request::PolicyRequest;
use crate::ruleset::build_ruleset;
use crate::seal::seal;
use crate::sys::{Landlock, PolicyEngine};

/// Compiles directives into a Landlock policy and enforces it on the
/// calling process.
///
/// Create using `Sandbox::builder()`.
#[derive(Debug, Clone)]
pub struct Sandbox<E = Landlock> {
    /// Kernel interface.
    engine: E,

    /// Per-category directive limits.
    limits: RuleLimits,

    /// Ask the kernel to keep logging denials after `execve`, when supported.
    log_denials_after_exec: bool,
}

impl Sandbox<Landlock> {
    /// Create a new sandbox builder targeting the running kernel.
    pub fn builder() -> SandboxBuilder<Landlock> {
        SandboxBuilder::new()
    }
}

impl<E: PolicyEngine> Sandbox<E> {
    /// Parse option tokens into a policy request.
    ///
    /// # Errors
    ///
    /// `ArgumentError` or `PolicyError`; no kernel call is made.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<PolicyRequest, SandboxError> {
        parse_directives(tokens, self.limits)
    }

    /// Probe the kernel and derive the effective masks.
    pub fn resolve(&self) -> Result<CapabilityProfile, SandboxError> {
        let profile = capability::resolve(&self.engine)?;
        if self.log_denials_after_exec {
            Ok(profile)
        } else {
            Ok(profile.without_exec_logging())
        }
    }

    /// Enforce an already parsed request on the calling process.
    ///
    /// The process must already have `PR_SET_NO_NEW_PRIVS` set (see
    /// [`restrict_privileges`](crate::restrict_privileges)).
    ///
    /// # Errors
    ///
    /// Any `CapabilityError`, `ResourceError`, or `KernelError`. On error the
    /// process may or may not be restricted and must not run the target.
    pub fn enforce(
        &self,
        request: &PolicyRequest,
        command: TargetCommand,
    ) -> Result<SealedCommand, SandboxError> {
        let profile = self.resolve()?;
        let ruleset = build_ruleset(&self.engine, request, &profile)?;
        seal(&self.engine, ruleset, profile.restrict_flags)?;

        Ok(SealedCommand {
            command,
            abi: profile.abi,
        })
    }

    /// Parse, resolve, build, and seal.
    ///
    /// Together with [`enforce`](Self::enforce), the only way to create a
    /// `SealedCommand`.
    pub fn apply<S: AsRef<str>>(
        &self,
        tokens: &[S],
        command: TargetCommand,
    ) -> Result<SealedCommand, SandboxError> {
        let request = self.parse(tokens)?;
        self.enforce(&request, command)
    }

    /// The kernel interface in use.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn limits(&self) -> RuleLimits {
        self.limits
    }
}

/// Builder for `Sandbox`.
#[derive(Debug, Clone)]
pub struct SandboxBuilder<E = Landlock> {
    engine: E,
    limits: RuleLimits,
    log_denials_after_exec: bool,
}

impl SandboxBuilder<Landlock> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            engine: Landlock,
            limits: RuleLimits::default(),
            log_denials_after_exec: true,
        }
    }
}

impl Default for SandboxBuilder<Landlock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PolicyEngine> SandboxBuilder<E> {
    /// Use a different kernel interface.
    pub fn engine<F: PolicyEngine>(self, engine: F) -> SandboxBuilder<F> {
        SandboxBuilder {
            engine,
            limits: self.limits,
            log_denials_after_exec: self.log_denials_after_exec,
        }
    }

    /// Set directive limits.
    pub fn limits(mut self, limits: RuleLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set maximum filesystem directives.
    pub fn max_fs_rules(mut self, max: usize) -> Self {
        self.limits.max_fs_rules = max;
        self
    }

    /// Set maximum network directives.
    pub fn max_net_rules(mut self, max: usize) -> Self {
        self.limits.max_net_rules = max;
        self
    }

    /// Request denial logging after `execve` on kernels that support it.
    ///
    /// Default: on.
    pub fn log_denials_after_exec(mut self, enabled: bool) -> Self {
        self.log_denials_after_exec = enabled;
        self
    }

    /// Build the sandbox.
    pub fn build(self) -> Sandbox<E> {
        Sandbox {
            engine: self.engine,
            limits: self.limits,
            log_denials_after_exec: self.log_denials_after_exec,
        }
    }
}
