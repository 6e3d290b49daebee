//! Shared helpers for integration tests.

#![allow(dead_code)]

use sst::{AccessFs, AccessNet, PolicyEngine, RestrictFlags, RulesetAttr};
use std::cell::RefCell;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd};
use std::path::PathBuf;
use std::process::{Command, Output};

/// One recorded kernel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe,
    CreateRuleset(RulesetAttr),
    AddPathBeneath { path: PathBuf, allowed: AccessFs },
    AddNetPort { port: u16, allowed: AccessNet },
    RestrictSelf(RestrictFlags),
}

/// Engine that records calls instead of restricting the test process.
#[derive(Debug)]
pub struct RecordingEngine {
    abi: Result<i32, i32>,
    calls: RefCell<Vec<Call>>,
}

impl RecordingEngine {
    pub fn new(abi: i32) -> Self {
        Self {
            abi: Ok(abi),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(errno: i32) -> Self {
        Self {
            abi: Err(errno),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn path_rules(&self) -> Vec<(PathBuf, AccessFs)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddPathBeneath { path, allowed } => Some((path, allowed)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl PolicyEngine for RecordingEngine {
    fn abi_version(&self) -> io::Result<i32> {
        self.record(Call::Probe);
        self.abi.map_err(io::Error::from_raw_os_error)
    }

    fn create_ruleset(&self, attr: &RulesetAttr) -> io::Result<OwnedFd> {
        self.record(Call::CreateRuleset(*attr));
        Ok(std::fs::File::open("/dev/null")?.into())
    }

    fn add_path_beneath(
        &self,
        _ruleset: BorrowedFd<'_>,
        parent: BorrowedFd<'_>,
        allowed: AccessFs,
    ) -> io::Result<()> {
        let path = std::fs::read_link(format!("/proc/self/fd/{}", parent.as_raw_fd()))?;
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
        Ok(())
    }
}

/// Run the `sst` binary with the given arguments.
pub fn run_sst(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sst"))
        .args(args)
        .output()
        .expect("failed to run sst")
}

/// Whether the running kernel can enforce the policies these tests use.
pub fn landlock_available() -> bool {
    match sst::Landlock.abi_version() {
        Ok(abi) => abi >= sst::MIN_ABI,
        Err(_) => false,
    }
}
