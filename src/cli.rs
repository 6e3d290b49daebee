//! Command-line splitting.
//!
//! Classifies `sst`'s own arguments into directive options, the `--`
//! separator, and the target command. Everything after the first `--` belongs
//! to the target verbatim.

use crate::command::TargetCommand;
use crate::error::ArgumentError;
use std::ffi::OsString;

/// Cheat sheet shown by `-h`/`--help`.
pub const HELP: &str = "\
sst - Simple Sandboxer Tool

`sst` runs a program with sandboxing applied through the Linux Landlock API.
You enable sandboxing for a specific feature, and then you specify an allowlist
of operations you want to allow.

Usage:

    sst option1 option2 optionN -- command arg1 arg2 argN

Enable sandboxing for filesystem/networking:

    ENABLE_FILESYSTEM_SANDBOXING
    ENABLE_NETWORK_SANDBOXING

Filesystem-related permissions:

    FILE_READ:<filepath>
    FILE_EXEC:<filepath>
    FILE_WRITE:<filepath>
    FILE_EXEC_WRITE:<filepath>
    FILE_WRITE_EXEC:<filepath>
    PATH_BENEATH_READ:<dir>
    PATH_BENEATH_EXEC:<dir>
    PATH_BENEATH_WRITE:<dir>
    PATH_BENEATH_EXEC_WRITE:<dir>
    PATH_BENEATH_WRITE_EXEC:<dir>

FILE_* must be used with regular files. PATH_BENEATH_* must be used with directories.

Networking-related permissions:

    ALLOW_INCOMING_TCP_PORT:<port>
    ALLOW_OUTGOING_TCP_PORT:<port>

Example that stops TCP networking for a shell (and anything run in it):

    sst ENABLE_NETWORK_SANDBOXING -- bash

Environment:

    SST_LOG    log filter (tracing-subscriber syntax), default \"warn\"
";

/// What the command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print help. Explicit requests go to stdout and succeed; help flags
    /// mixed into a directive list go to stderr and fail.
    Help { to_stderr: bool },

    /// Sandbox `command` with the given directive options.
    Run {
        options: Vec<String>,
        command: TargetCommand,
    },
}

/// Classification of one of `sst`'s own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ArgType {
    /// `-h` or `--help` before the separator
    Help,
    /// The first `--`
    Separator,
    /// Anything before the separator
    Option,
    /// Anything after the separator
    Command,
}

fn classify_arg(arg: &OsString, after_separator: bool) -> ArgType {
    if after_separator {
        return ArgType::Command;
    }

    match arg.to_str() {
        Some("--") => ArgType::Separator,
        Some("-h" | "--help") => ArgType::Help,
        _ => ArgType::Option,
    }
}

/// Interpret `sst`'s arguments, not including `argv[0]`.
///
/// # Errors
///
/// - `MissingSeparator` if there is no `--`
/// - `MissingCommand` if nothing follows `--`
/// - `InvalidUnicode` if an option is not UTF-8
pub fn parse_invocation(args: Vec<OsString>) -> Result<Invocation, ArgumentError> {
    if args.is_empty() || (args.len() == 1 && classify_arg(&args[0], false) == ArgType::Help) {
        return Ok(Invocation::Help { to_stderr: false });
    }

    let mut after_separator = false;
    let mut classified = Vec::with_capacity(args.len());
    for arg in &args {
        let arg_type = classify_arg(arg, after_separator);
        if arg_type == ArgType::Separator {
            after_separator = true;
        }
        classified.push(arg_type);
    }

    let separator = classified
        .iter()
        .position(|t| *t == ArgType::Separator)
        .ok_or(ArgumentError::MissingSeparator)?;

    if classified[..separator].contains(&ArgType::Help) {
        return Ok(Invocation::Help { to_stderr: true });
    }

    let mut args = args;
    let command_argv = args.split_off(separator + 1);
    let command = TargetCommand::from_argv(command_argv).ok_or(ArgumentError::MissingCommand)?;

    args.truncate(separator);
    let options = args
        .into_iter()
        .enumerate()
        .map(|(index, arg)| {
            arg.into_string().map_err(|arg| ArgumentError::InvalidUnicode {
                position: index + 1,
                lossy: arg.to_string_lossy().into_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Invocation::Run { options, command })
}
