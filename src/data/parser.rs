use indexmap::IndexMap;
use indexmap::map::Entry;
use log::{debug, warn};
use thiserror::Error;

use super::model::{PropellerDataset, Row, Table};

/// Placeholder the dynamometer files use for a missing measurement.
pub const MISSING_VALUE: &str = "-";

const NAN_PLACEHOLDER: &str = "-NaN";

/// Tokens shorter than this are ignored when classifying a line.
const MIN_TOKEN_LEN: usize = 3;

/// Delimiters around the propeller name in a file's first line.
const NAME_START: &str = " (";
const NAME_END: char = '.';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("file is empty, expected a header line")]
    MissingHeader,

    #[error("header line has no propeller name between \" (\" and \".\": {0:?}")]
    MalformedHeader(String),
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// A line that survived parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    /// Single whole number naming the RPM of the table that follows.
    RpmMarker(u32),
    /// Numeric values of a data row, in file order.
    Values(Vec<f64>),
}

/// Separate embedded minus signs, zero out `-NaN` and collapse whitespace.
pub fn normalize_line(line: &str) -> String {
    let spaced = line.replace('-', " -");
    let spaced = spaced.replace(NAN_PLACEHOLDER, " 0.00");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | ',' | '-')
}

fn parse_number(token: &str) -> Option<f64> {
    if token == MISSING_VALUE {
        return Some(0.0);
    }
    token.replace(',', "").parse::<f64>().ok()
}

/// Classify one raw line.
///
/// The first token of at least three characters decides: without a decimal
/// point it is an RPM marker, otherwise every token on the line is a value.
/// Shorter tokens never classify a line, so single- and two-digit numbers on
/// their own are dropped as noise. Returns `None` for headers, blank lines
/// and anything that does not parse.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let normalized = normalize_line(line);
    let tokens: Vec<&str> = normalized
        .split(|c: char| !is_token_char(c))
        .filter(|t| !t.is_empty())
        .collect();

    let first = tokens.iter().find(|t| t.len() >= MIN_TOKEN_LEN)?;

    if !first.contains('.') {
        return match first.replace(',', "").parse::<u32>() {
            Ok(rpm) => Some(ParsedLine::RpmMarker(rpm)),
            Err(_) => {
                debug!("Ignoring line with non-RPM marker token {first:?}: {line:?}");
                None
            }
        };
    }

    let mut values = Vec::with_capacity(tokens.len());
    for token in &tokens {
        match parse_number(token) {
            Some(v) => values.push(v),
            None => {
                debug!("Ignoring line with non-numeric token {token:?}: {line:?}");
                return None;
            }
        }
    }
    Some(ParsedLine::Values(values))
}

/// Extract the propeller name from a file's first line.
pub fn parse_header(line: &str) -> Result<String, ParseError> {
    let malformed = || ParseError::MalformedHeader(line.to_string());
    let start = line.find(NAME_START).ok_or_else(malformed)? + NAME_START.len();
    let end = line.rfind(NAME_END).ok_or_else(malformed)?;
    if end < start {
        return Err(malformed());
    }
    Ok(line[start..end].to_string())
}

// ---------------------------------------------------------------------------
// Grouping rows into RPM tables
// ---------------------------------------------------------------------------

struct TableBuilder {
    tables: IndexMap<u32, Table>,
    rpm: Option<u32>,
    rows: Vec<Row>,
}

impl TableBuilder {
    fn new() -> Self {
        TableBuilder {
            tables: IndexMap::new(),
            rpm: None,
            rows: Vec::new(),
        }
    }

    fn marker(&mut self, rpm: u32) {
        self.close();
        self.rpm = Some(rpm);
    }

    fn values(&mut self, values: Vec<f64>) {
        let Some(rpm) = self.rpm else {
            warn!("Dropping data row before any RPM marker: {values:?}");
            return;
        };
        match Row::from_values(&values) {
            Some(row) => self.rows.push(row),
            None => warn!(
                "Dropping short row in {rpm} RPM table ({} values): {values:?}",
                values.len()
            ),
        }
    }

    fn close(&mut self) {
        let rows = std::mem::take(&mut self.rows);
        let Some(rpm) = self.rpm.take() else {
            return;
        };
        if rows.is_empty() {
            debug!("RPM marker {rpm} has no data rows, skipping");
            return;
        }

        let table = Table::new(rows);
        if !table.is_velocity_sorted() {
            warn!("{rpm} RPM table is not sorted by velocity; interpolation trusts file order");
        }
        match self.tables.entry(rpm) {
            Entry::Occupied(mut slot) => {
                warn!("Duplicate {rpm} RPM table, replacing the earlier one");
                slot.insert(table);
            }
            Entry::Vacant(slot) => {
                slot.insert(table);
            }
        }
    }

    fn finish(mut self) -> IndexMap<u32, Table> {
        self.close();
        self.tables
    }
}

/// Group parsed lines into per-RPM tables.
///
/// A marker closes the table being accumulated and opens the next one; the
/// end of input closes the last. Tables without any complete row are dropped.
pub fn organize<I>(lines: I) -> IndexMap<u32, Table>
where
    I: IntoIterator<Item = ParsedLine>,
{
    let mut builder = TableBuilder::new();
    for line in lines {
        match line {
            ParsedLine::RpmMarker(rpm) => builder.marker(rpm),
            ParsedLine::Values(values) => builder.values(values),
        }
    }
    builder.finish()
}

/// Parse the full text of one propeller file.
pub fn parse_propeller(text: &str) -> Result<PropellerDataset, ParseError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(ParseError::MissingHeader)?;
    let name = parse_header(header)?;

    let tables = organize(lines.filter_map(parse_line));
    debug!("Organized {name}: {} RPM tables", tables.len());
    Ok(PropellerDataset::new(name, tables))
}
