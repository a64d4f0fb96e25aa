use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidCyclePoint,
    InvalidInterval,
    PointOverflow,
    InvalidTimeZone,
    SuiteNotFound,
    MissingInitialPoint,
    ConfigParseError,
    ConfigReadError,
    EmptyEdge,
    NoQualifyingEdges,
    ExpansionLimit,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidCyclePoint => "E1001",
            Self::InvalidInterval => "E1002",
            Self::PointOverflow => "E1003",
            Self::InvalidTimeZone => "E1004",
            Self::SuiteNotFound => "E2001",
            Self::MissingInitialPoint => "E2002",
            Self::ConfigParseError => "E2003",
            Self::ConfigReadError => "E2004",
            Self::EmptyEdge => "E3001",
            Self::NoQualifyingEdges => "E3002",
            Self::ExpansionLimit => "E3003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidCyclePoint => "Invalid cycle point",
            Self::InvalidInterval => "Invalid cycle interval",
            Self::PointOverflow => "Cycle point out of range",
            Self::InvalidTimeZone => "Invalid cycle point time zone",
            Self::SuiteNotFound => "Suite not found",
            Self::MissingInitialPoint => "No initial cycle point",
            Self::ConfigParseError => "Suite file parse error",
            Self::ConfigReadError => "Suite file read error",
            Self::EmptyEdge => "Graph edge has no endpoints",
            Self::NoQualifyingEdges => "No qualifying graph edges",
            Self::ExpansionLimit => "Graph expansion limit reached",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidCyclePoint => {
                Some("Use an integer point or an ISO 8601 date-time such as 20200101T0000Z.")
            }
            Self::InvalidInterval => Some("Use P<n> for integer cycling or an ISO 8601 duration such as PT6H."),
            Self::PointOverflow => Some("Narrow the cycle range or use a smaller interval."),
            Self::InvalidTimeZone => Some("Use Z, +HH, +HHMM or +HH:MM."),
            Self::SuiteNotFound => Some("Pass a registered suite name, a suite directory, or a suite.toml path."),
            Self::MissingInitialPoint => {
                Some("Set [scheduling] initial_cycle_point or pass --icp.")
            }
            Self::ConfigParseError => Some("Fix syntax in suite.toml and retry."),
            Self::ConfigReadError => Some("Check that the suite file exists and is readable."),
            Self::EmptyEdge => Some("Give every graph edge a left or right task."),
            Self::NoQualifyingEdges => None,
            Self::ExpansionLimit => {
                Some("Narrow the START..STOP window or use a longer graph interval.")
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

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 12] = [
        ErrorCode::InvalidCyclePoint,
        ErrorCode::InvalidInterval,
        ErrorCode::PointOverflow,
        ErrorCode::InvalidTimeZone,
        ErrorCode::SuiteNotFound,
        ErrorCode::MissingInitialPoint,
        ErrorCode::ConfigParseError,
        ErrorCode::ConfigReadError,
        ErrorCode::EmptyEdge,
        ErrorCode::NoQualifyingEdges,
        ErrorCode::ExpansionLimit,
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
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::SuiteNotFound.to_string(), "E2001");
    }
}
