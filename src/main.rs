//! `sst` binary.
//!
//! Usage: `sst option1 option2 optionN -- command arg1 arg2 argN`

use sst::{parse_invocation, restrict_privileges, Invocation, Sandbox, HELP};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Diagnostics go to stderr so the target's stdout stays untouched
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(EnvFilter::try_from_env("SST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(err) = restrict_privileges() {
        return fail(&err);
    }

    let invocation = match parse_invocation(std::env::args_os().skip(1).collect()) {
        Ok(invocation) => invocation,
        Err(err) => return fail(&err),
    };

    match invocation {
        Invocation::Help { to_stderr: false } => {
            print!("{HELP}");
            ExitCode::SUCCESS
        }
        Invocation::Help { to_stderr: true } => {
            eprint!("{HELP}");
            ExitCode::FAILURE
        }
        Invocation::Run { options, command } => {
            let sandbox = Sandbox::builder().build();
            match sandbox.apply(&options, command) {
                Ok(sealed) => fail(&sealed.exec()),
                Err(err) => fail(&err),
            }
        }
    }
}

fn fail(err: &dyn std::error::Error) -> ExitCode {
    eprintln!("sst: error: {err}");
    ExitCode::FAILURE
}
