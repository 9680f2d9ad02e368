use std::fmt;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    PrefixConfigInvalid,
    RecordUnreadable,
    MalformedJson,
    MalformedCounter,
    MalformedNumericList,
    SchemaMismatch,
    ZeroFrequency,
    ExportWriteFailed,
    RenderFailed,
    MalformedStreamRow,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::PrefixConfigInvalid => "E1002",
            Self::RecordUnreadable => "E2001",
            Self::MalformedJson => "E2002",
            Self::MalformedCounter => "E2003",
            Self::MalformedNumericList => "E2004",
            Self::SchemaMismatch => "E2005",
            Self::ZeroFrequency => "E3001",
            Self::ExportWriteFailed => "E5001",
            Self::RenderFailed => "E5002",
            Self::MalformedStreamRow => "E6001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::PrefixConfigInvalid => "Prefix config file is incomplete",
            Self::RecordUnreadable => "Record file could not be read",
            Self::MalformedJson => "Record is not valid JSON",
            Self::MalformedCounter => "Malformed key,value counter line",
            Self::MalformedNumericList => "Malformed numeric list",
            Self::SchemaMismatch => "Record does not match the analysis schema",
            Self::ZeroFrequency => "Size mean over a zero frequency",
            Self::ExportWriteFailed => "Export table write failed",
            Self::RenderFailed => "Chart renderer failed",
            Self::MalformedStreamRow => "Malformed stream row",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in cohesion.toml and retry."),
            Self::PrefixConfigInvalid => {
                Some("The file needs a `directory <path>` line and a `prefix <string>` line.")
            }
            Self::RecordUnreadable => Some("Check that the path exists and is readable."),
            Self::MalformedJson => Some("Re-export the record from the analysis run."),
            Self::MalformedCounter => Some("Each non-empty line must look like `<int>,<number>`."),
            Self::MalformedNumericList => Some("Lists must be comma-separated numbers."),
            Self::SchemaMismatch => {
                Some("Records need every field under `content.\"graph property\"`.")
            }
            Self::ZeroFrequency => Some("The structure blob has no occurrences for this K."),
            Self::ExportWriteFailed => Some("Check disk space and write permissions."),
            Self::RenderFailed => {
                Some("Verify the chart script and its interpreter are installed.")
            }
            Self::MalformedStreamRow => Some("Rows must look like `<id>\\t<t>,<x>,<y>`."),
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
        ErrorCode::ConfigParseError,
        ErrorCode::PrefixConfigInvalid,
        ErrorCode::RecordUnreadable,
        ErrorCode::MalformedJson,
        ErrorCode::MalformedCounter,
        ErrorCode::MalformedNumericList,
        ErrorCode::SchemaMismatch,
        ErrorCode::ZeroFrequency,
        ErrorCode::ExportWriteFailed,
        ErrorCode::RenderFailed,
        ErrorCode::MalformedStreamRow,
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
            let raw = code.code();
            assert_eq!(raw.len(), 5);
            assert!(raw.starts_with('E'));
            assert!(raw.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(ErrorCode::ZeroFrequency.to_string(), "E3001");
    }
}
