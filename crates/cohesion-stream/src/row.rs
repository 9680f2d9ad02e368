//! Line parser for grouped event rows.
//!
//! # Format
//!
//! ```text
//! group_id \t t,x,y
//! ```
//!
//! - Any line containing `time` is a column header and is returned as
//!   [`ParsedLine::Header`].
//! - Blank/whitespace-only lines are returned as [`ParsedLine::Blank`].
//! - Data lines are split on the first tab; the value holds exactly three
//!   comma-separated integers.

/// Substring that marks a header line.
pub const HEADER_MARKER: &str = "time";

/// One event of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub group: i64,
    pub t: i64,
    pub x: i64,
    pub y: i64,
}

/// Result of parsing one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine {
    Header,
    Blank,
    Row(Row),
}

/// Errors that can occur while parsing a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("expected `id<TAB>t,x,y`, found no tab")]
    MissingTab,

    #[error("expected 3 comma-separated values, found {found}")]
    FieldCount { found: usize },

    #[error("invalid group id '{0}'")]
    InvalidGroup(String),

    #[error("invalid {field} '{raw}'")]
    InvalidField { field: &'static str, raw: String },
}

/// Parse one line of the stream.
///
/// # Errors
///
/// Returns [`RowError`] if a data line is malformed.
pub fn parse_line(line: &str) -> Result<ParsedLine, RowError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ParsedLine::Blank);
    }
    if line.contains(HEADER_MARKER) {
        return Ok(ParsedLine::Header);
    }

    let (key, value) = line.split_once('\t').ok_or(RowError::MissingTab)?;
    let group = key
        .trim()
        .parse()
        .map_err(|_| RowError::InvalidGroup(key.trim().to_string()))?;

    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    let &[t, x, y] = fields.as_slice() else {
        return Err(RowError::FieldCount {
            found: fields.len(),
        });
    };

    Ok(ParsedLine::Row(Row {
        group,
        t: parse_field("t", t)?,
        x: parse_field("x", x)?,
        y: parse_field("y", y)?,
    }))
}

fn parse_field(field: &'static str, raw: &str) -> Result<i64, RowError> {
    raw.parse().map_err(|_| RowError::InvalidField {
        field,
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_row() {
        assert_eq!(
            parse_line("17\t3,100,-20\n"),
            Ok(ParsedLine::Row(Row {
                group: 17,
                t: 3,
                x: 100,
                y: -20
            }))
        );
    }

    #[test]
    fn header_and_blank_lines() {
        assert_eq!(parse_line("id\ttime,x,y"), Ok(ParsedLine::Header));
        assert_eq!(parse_line("   "), Ok(ParsedLine::Blank));
    }

    #[test]
    fn missing_tab_is_rejected() {
        assert_eq!(parse_line("1 2,3,4"), Err(RowError::MissingTab));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert_eq!(
            parse_line("1\t2,3"),
            Err(RowError::FieldCount { found: 2 })
        );
        assert_eq!(
            parse_line("1\t2,3,4,5"),
            Err(RowError::FieldCount { found: 4 })
        );
    }

    #[test]
    fn non_integer_values_are_rejected() {
        assert_eq!(
            parse_line("x\t1,2,3"),
            Err(RowError::InvalidGroup("x".to_string()))
        );
        assert_eq!(
            parse_line("1\t1,2.5,3"),
            Err(RowError::InvalidField {
                field: "x",
                raw: "2.5".to_string()
            })
        );
    }
}
