//! Control commands for a running poller.
//!
//! A client (e.g. `numa-updater check-now`) writes one line per command to the
//! control socket: `check`, `restart` or `restart <token>`.

use std::path::PathBuf;

use crate::config::APP_NAME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Run a check immediately.
    CheckNow,
    /// Stop the timer and start a new one with this token.
    Restart { token: Option<String> },
}

impl ControlCommand {
    /// Parse one protocol line. Unknown or malformed lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        match verb {
            "check" if rest.is_empty() => Some(ControlCommand::CheckNow),
            "restart" if rest.is_empty() => Some(ControlCommand::Restart { token: None }),
            "restart" if !rest.contains(char::is_whitespace) => Some(ControlCommand::Restart {
                token: Some(rest.to_string()),
            }),
            _ => None,
        }
    }

    /// Wire form, newline-terminated.
    pub fn to_line(&self) -> String {
        match self {
            ControlCommand::CheckNow => "check\n".to_string(),
            ControlCommand::Restart { token: None } => "restart\n".to_string(),
            ControlCommand::Restart { token: Some(t) } => format!("restart {}\n", t),
        }
    }
}

/// Default path for the control socket (XDG state dir, next to the log file).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dir = xdg::BaseDirectories::with_prefix(APP_NAME)?.get_state_home();
    Ok(dir.join(APP_NAME).join("control.sock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check() {
        assert_eq!(ControlCommand::parse("check"), Some(ControlCommand::CheckNow));
        assert_eq!(ControlCommand::parse("  check \r\n"), Some(ControlCommand::CheckNow));
    }

    #[test]
    fn parse_restart_with_and_without_token() {
        assert_eq!(
            ControlCommand::parse("restart"),
            Some(ControlCommand::Restart { token: None })
        );
        assert_eq!(
            ControlCommand::parse("restart abc123"),
            Some(ControlCommand::Restart {
                token: Some("abc123".to_string())
            })
        );
    }

    #[test]
    fn malformed_lines_ignored() {
        assert_eq!(ControlCommand::parse(""), None);
        assert_eq!(ControlCommand::parse("check now"), None);
        assert_eq!(ControlCommand::parse("restart a b"), None);
        assert_eq!(ControlCommand::parse("pause 1"), None);
        assert_eq!(ControlCommand::parse("CHECK"), None);
    }

    #[test]
    fn to_line_parses_back() {
        for cmd in [
            ControlCommand::CheckNow,
            ControlCommand::Restart { token: None },
            ControlCommand::Restart {
                token: Some("t0k".to_string()),
            },
        ] {
            assert_eq!(ControlCommand::parse(&cmd.to_line()), Some(cmd));
        }
    }
}
