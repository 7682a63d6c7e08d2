use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidConfigValue,
    InputReadFailed,
    InputParseFailed,
    UnrecognizedShape,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidConfigValue => "E1004",
            Self::InputReadFailed => "E2101",
            Self::InputParseFailed => "E2102",
            Self::UnrecognizedShape => "E2103",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file could not be read or parsed",
            Self::InvalidConfigValue => "Invalid config value",
            Self::InputReadFailed => "Issue export could not be read",
            Self::InputParseFailed => "Issue export could not be parsed",
            Self::UnrecognizedShape => "Unrecognized insights/diff shape",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Make .beadlens/config.toml readable, valid TOML and retry."),
            Self::InvalidConfigValue => {
                Some("top_n and max_iterations must be >= 1; tolerance must be positive.")
            }
            Self::InputReadFailed => Some("Check the export path and read permissions."),
            Self::InputParseFailed => {
                Some("Supply a JSON array of issues or one JSON object per line (JSONL).")
            }
            Self::UnrecognizedShape => {
                Some("Pass a canonical, PascalCase, or camelCase insights/diff record.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected}: '{got}'")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 6] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidConfigValue,
        ErrorCode::InputReadFailed,
        ErrorCode::InputParseFailed,
        ErrorCode::UnrecognizedShape,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let text = code.code();
            assert_eq!(text.len(), 5);
            assert!(text.starts_with('E'));
            assert!(text.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }
}
