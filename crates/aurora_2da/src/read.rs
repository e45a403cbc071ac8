//! Types for reading 2DA text tables.

use std::path::Path;

use aurora_core::ByteSource;
use tracing::instrument;

use crate::error::{Error, Result};

const SIGNATURE: &str = "2DA V2.0";

/// A parsed 2DA table.
pub struct TwoDA {
    columns: Vec<String>,
    labels: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    default: Option<String>,
}

impl TwoDA {
    /// Parse a table from text.
    #[instrument(skip(text), err)]
    pub fn parse(text: &str) -> Result<TwoDA> {
        let mut lines = text.lines();

        let signature = lines.next().unwrap_or("").trim_end();
        if signature != SIGNATURE {
            return Err(Error::bad_magic("2DA V2.0", signature.as_bytes()));
        }

        let mut default = None;
        let mut header = None;
        for line in lines.by_ref() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix("DEFAULT:") {
                default = Some(rest.trim().trim_matches('"').to_owned());
                continue;
            }
            header = Some(tokenize(trimmed));
            break;
        }
        let Some(header) = header else {
            return Err(Error::Malformed("2DA has no column header row".into()));
        };
        let columns: Vec<String> = header.into_iter().map(|t| t.unwrap_or_default()).collect();

        let mut labels = Vec::new();
        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let mut tokens = tokenize(line).into_iter();
            let label = tokens.next().flatten().unwrap_or_default();
            let mut cells: Vec<Option<String>> = tokens.collect();
            // short rows read as missing cells
            cells.resize(columns.len(), None);
            cells.truncate(columns.len());
            labels.push(label);
            rows.push(cells);
        }

        Ok(TwoDA {
            columns,
            labels,
            rows,
            default,
        })
    }

    /// Open and parse a `.2da` file.
    pub fn open(path: impl AsRef<Path>) -> Result<TwoDA> {
        Self::new(ByteSource::open(path)?)
    }

    /// Parse a table from a byte source.
    pub fn new(source: ByteSource) -> Result<TwoDA> {
        let data = source.to_vec()?;
        Self::parse(&String::from_utf8_lossy(&data))
    }

    /// The declared default value, if any.
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The label token of a row (conventionally the row number).
    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.labels.get(row).map(String::as_str)
    }

    /// Position of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// The cell at `(row, column index)`; missing cells resolve to the
    /// table default, and to `None` without one.
    pub fn get_str_at(&self, row: usize, column: usize) -> Option<&str> {
        if column >= self.columns.len() {
            return None;
        }
        match self.rows.get(row)?.get(column)? {
            Some(value) => Some(value),
            None => self.default.as_deref(),
        }
    }

    /// The cell at `(row, column name)`.
    pub fn get_str(&self, row: usize, column: &str) -> Option<&str> {
        self.get_str_at(row, self.column_index(column)?)
    }

    /// An integer cell; unparseable text reads as missing.
    pub fn get_int(&self, row: usize, column: &str) -> Option<i32> {
        parse_int(self.get_str(row, column)?)
    }

    pub fn get_int_at(&self, row: usize, column: usize) -> Option<i32> {
        parse_int(self.get_str_at(row, column)?)
    }

    /// A float cell; unparseable text reads as missing.
    pub fn get_float(&self, row: usize, column: &str) -> Option<f32> {
        self.get_str(row, column)?.parse().ok()
    }

    pub fn get_float_at(&self, row: usize, column: usize) -> Option<f32> {
        self.get_str_at(row, column)?.parse().ok()
    }
}

fn parse_int(text: &str) -> Option<i32> {
    // rules tables occasionally write integers in hex
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i32::from_str_radix(hex, 16).ok();
    }
    text.parse().ok()
}

/// Split a row into cells: whitespace-delimited, `"` quoting, `****` as
/// the missing-value token.
fn tokenize(line: &str) -> Vec<Option<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == '"' {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        if token == "****" {
            tokens.push(None);
        } else {
            tokens.push(Some(token));
        }
    }
    tokens
}

#[cfg(test)]
mod test {
    use super::TwoDA;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
2DA V2.0
DEFAULT: 0

   LABEL      VALUE   NAME
0  first      1       \"two words\"
1  second     ****    word
2  third      0x10
";

    #[test]
    fn cells_and_labels() {
        let table = TwoDA::parse(TABLE).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_label(1), Some("1"));
        assert_eq!(table.get_str(0, "LABEL"), Some("first"));
        assert_eq!(table.get_str(0, "NAME"), Some("two words"));
    }

    #[test]
    fn column_lookup_ignores_case() {
        let table = TwoDA::parse(TABLE).unwrap();
        assert_eq!(table.column_index("value"), Some(1));
        assert_eq!(table.get_int(0, "value"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn stars_resolve_to_default() {
        let table = TwoDA::parse(TABLE).unwrap();
        assert_eq!(table.get_str(1, "VALUE"), Some("0"));
        assert_eq!(table.get_int(1, "VALUE"), Some(0));
    }

    #[test]
    fn short_row_reads_as_default() {
        let table = TwoDA::parse(TABLE).unwrap();
        assert_eq!(table.get_str(2, "NAME"), Some("0"));
    }

    #[test]
    fn missing_without_default_is_none() {
        let table = TwoDA::parse("2DA V2.0\n A B\n0 **** x\n").unwrap();
        assert_eq!(table.default_value(), None);
        assert_eq!(table.get_str(0, "A"), None);
        assert_eq!(table.get_str(0, "B"), Some("x"));
        assert_eq!(table.get_int(0, "A"), None);
    }

    #[test]
    fn hex_integers() {
        let table = TwoDA::parse(TABLE).unwrap();
        assert_eq!(table.get_int(2, "VALUE"), Some(16));
    }

    #[test]
    fn floats() {
        let table = TwoDA::parse("2DA V2.0\n F\n0 1.5\n1 nope\n").unwrap();
        assert_eq!(table.get_float(0, "F"), Some(1.5));
        assert_eq!(table.get_float(1, "F"), None);
    }

    #[test]
    fn bad_signature_rejected() {
        assert!(matches!(
            TwoDA::parse("2DA V1.0\n A\n"),
            Err(Error::BadMagic { .. })
        ));
    }

    #[test]
    fn missing_header_is_malformed() {
        assert!(matches!(
            TwoDA::parse("2DA V2.0\n\n"),
            Err(Error::Malformed(_))
        ));
    }
}
