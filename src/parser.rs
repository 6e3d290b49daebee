//! Directive parsing.
//!
//! Turns the option tokens (everything before `--`) into a [`PolicyRequest`].
//! Two passes: the first finds the enabling keywords, the second parses each
//! directive against the verb table. No filesystem or kernel access happens
//! here.

use crate::directive::{lookup, Directive, VerbKind, ENABLE_FILESYSTEM, ENABLE_NETWORK};
use crate::error::{ArgumentError, PolicyError, SandboxError};
use crate::limits::RuleLimits;
use crate::request::{CategoryToggles, PolicyRequest};
use std::path::PathBuf;

/// Parse option tokens into a policy request.
///
/// # Errors
///
/// - `ArgumentError` for empty, unrecognized, or payload-less tokens
/// - `PolicyError` for directives whose category is not enabled, invalid
///   ports, exceeded limits, or when no category is enabled at all
pub fn parse_directives<S: AsRef<str>>(
    tokens: &[S],
    limits: RuleLimits,
) -> Result<PolicyRequest, SandboxError> {
    let toggles = CategoryToggles::scan(tokens);
    let mut request = PolicyRequest::new(toggles, limits);

    for (index, token) in tokens.iter().enumerate() {
        let token = token.as_ref();

        // Handled by the first pass
        if token == ENABLE_FILESYSTEM || token == ENABLE_NETWORK {
            continue;
        }

        if token.is_empty() {
            return Err(ArgumentError::EmptyToken {
                position: index + 1,
            }
            .into());
        }

        let (verb, payload) = lookup(token).ok_or_else(|| ArgumentError::Unrecognized {
            token: token.to_string(),
        })?;

        if !toggles.is_enabled(verb.category()) {
            return Err(PolicyError::CategoryDisabled {
                verb: verb.name,
                keyword: verb.category().keyword(),
            }
            .into());
        }

        if payload.is_empty() {
            return Err(ArgumentError::MissingPayload {
                verb: verb.name,
                expected: verb.payload_name(),
            }
            .into());
        }

        let directive = match verb.kind {
            VerbKind::Filesystem { scope, rights } => Directive::Filesystem {
                path: PathBuf::from(payload),
                scope,
                rights,
            },
            VerbKind::Network(direction) => Directive::Network {
                port: parse_port(payload).ok_or_else(|| PolicyError::InvalidPort {
                    verb: verb.name,
                    payload: payload.to_string(),
                })?,
                direction,
            },
        };

        request.push(directive)?;
    }

    if !toggles.any() {
        return Err(PolicyError::NothingEnabled.into());
    }

    tracing::debug!(
        filesystem = toggles.filesystem,
        network = toggles.network,
        directives = request.directives().len(),
        "Parsed policy request"
    );

    Ok(request)
}

/// Parse a TCP port: 1 to 5 ASCII digits, value at most 65535.
///
/// Signs, whitespace, and non-ASCII digits are rejected.
pub fn parse_port(payload: &str) -> Option<u16> {
    if payload.is_empty() || payload.len() > 5 {
        return None;
    }
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Five digits fit in u32, so only the range can fail
    let value: u32 = payload.parse().ok()?;
    u16::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessRights;
    use crate::directive::{Direction, Scope};

    fn parse(tokens: &[&str]) -> Result<PolicyRequest, SandboxError> {
        parse_directives(tokens, RuleLimits::default())
    }

    #[test]
    fn test_file_read() {
        let request = parse(&["ENABLE_FILESYSTEM_SANDBOXING", "FILE_READ:/etc/hosts"]).unwrap();
        assert_eq!(
            request.directives(),
            &[Directive::Filesystem {
                path: PathBuf::from("/etc/hosts"),
                scope: Scope::File,
                rights: AccessRights::READ_ONLY,
            }]
        );
        assert!(request.toggles().filesystem);
        assert!(!request.toggles().network);
    }

    #[test]
    fn test_file_read_without_keyword() {
        let err = parse(&["FILE_READ:/etc/hosts"]).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Policy(PolicyError::CategoryDisabled {
                verb: "FILE_READ",
                keyword: "ENABLE_FILESYSTEM_SANDBOXING"
            })
        ));
        assert_eq!(
            err.to_string(),
            "FILE_READ requires ENABLE_FILESYSTEM_SANDBOXING"
        );
    }

    #[test]
    fn test_keyword_after_rules() {
        let late = parse(&["ALLOW_INCOMING_TCP_PORT:8080", "ENABLE_NETWORK_SANDBOXING"]).unwrap();
        let early = parse(&["ENABLE_NETWORK_SANDBOXING", "ALLOW_INCOMING_TCP_PORT:8080"]).unwrap();
        assert_eq!(late, early);
    }

    #[test]
    fn test_network_keyword_does_not_enable_filesystem() {
        let err = parse(&["ENABLE_NETWORK_SANDBOXING", "PATH_BENEATH_READ:/usr"]).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Policy(PolicyError::CategoryDisabled {
                keyword: "ENABLE_FILESYSTEM_SANDBOXING",
                ..
            })
        ));
    }

    #[test]
    fn test_nothing_enabled() {
        let err = parse(&[]).unwrap_err();
        assert!(matches!(err, SandboxError::Policy(PolicyError::NothingEnabled)));
    }

    #[test]
    fn test_only_keyword_is_valid() {
        let request = parse(&["ENABLE_NETWORK_SANDBOXING"]).unwrap();
        assert!(request.directives().is_empty());
    }

    #[test]
    fn test_empty_token() {
        let err = parse(&["ENABLE_FILESYSTEM_SANDBOXING", ""]).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Argument(ArgumentError::EmptyToken { position: 2 })
        ));
    }

    #[test]
    fn test_missing_path() {
        let err = parse(&["ENABLE_FILESYSTEM_SANDBOXING", "PATH_BENEATH_EXEC:"]).unwrap_err();
        assert_eq!(err.to_string(), "PATH_BENEATH_EXEC: missing path");
    }

    #[test]
    fn test_missing_port() {
        let err = parse(&["ENABLE_NETWORK_SANDBOXING", "ALLOW_OUTGOING_TCP_PORT:"]).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Argument(ArgumentError::MissingPayload {
                expected: "port",
                ..
            })
        ));
    }

    #[test]
    fn test_unrecognized_named_verbatim() {
        let err = parse(&["ENABLE_FILESYSTEM_SANDBOXING", "FILE_REED:/etc"]).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized option: FILE_REED:/etc");
    }

    #[test]
    fn test_same_port_both_directions_kept_separate() {
        let request = parse(&[
            "ENABLE_NETWORK_SANDBOXING",
            "ALLOW_INCOMING_TCP_PORT:8080",
            "ALLOW_OUTGOING_TCP_PORT:8080",
        ])
        .unwrap();
        let rules: Vec<_> = request.network_rules().collect();
        assert_eq!(rules, vec![(8080, Direction::Bind), (8080, Direction::Connect)]);
    }

    #[test]
    fn test_port_bounds() {
        assert_eq!(parse_port("0"), Some(0));
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("00080"), Some(80));
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("99999"), None);
        assert_eq!(parse_port("100000"), None);
    }

    #[test]
    fn test_port_rejects_junk() {
        for payload in ["", "+80", "-1", " 80", "80 ", "8o", "0x50", "８０"] {
            assert_eq!(parse_port(payload), None, "{payload:?}");
        }
    }

    #[test]
    fn test_invalid_port_error() {
        let err =
            parse(&["ENABLE_NETWORK_SANDBOXING", "ALLOW_INCOMING_TCP_PORT:70000"]).unwrap_err();
        assert_eq!(err.to_string(), "ALLOW_INCOMING_TCP_PORT: invalid port '70000'");
    }

    #[test]
    fn test_capacity() {
        let mut tokens = vec!["ENABLE_FILESYSTEM_SANDBOXING".to_string()];
        tokens.extend((0..3).map(|i| format!("FILE_READ:/tmp/{i}")));

        let limits = RuleLimits::default().with_max_fs_rules(2);
        let err = parse_directives(&tokens, limits).unwrap_err();
        assert!(matches!(
            err,
            SandboxError::Policy(PolicyError::TooManyRules { max: 2, .. })
        ));
    }
}
