//! Reading delimited text tables.
//!
//! The whole file is read into memory and handed to the `csv` parser with
//! the table's parse options. The result is a header row plus data rows of
//! raw strings; typing happens later in the coercer.

use camino::Utf8Path;
use tabgraph_schemas::ParseOptions;
use tracing::{debug, instrument};

use crate::error::ConvertError;

/// Candidate delimiters for detection, in tie-breaking order.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// A parsed table: the header row and every kept data row, all the same
/// width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// One data row of raw cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position among the records the parser produced, counting
    /// skipped empty rows. Blank and comment lines are not records.
    pub number: usize,
    pub cells: Vec<String>,
}

/// Reads and parses the table at `path`.
///
/// # Errors
///
/// Returns [`ConvertError`] if:
/// - The file cannot be read ([`ConvertError::is_io`])
/// - The contents are not valid delimited text, a row has the wrong number
///   of fields, or the parse options are unusable
///   ([`ConvertError::is_parse`])
#[instrument(skip(options))]
pub fn load_table(
    path: &Utf8Path,
    options: &ParseOptions,
) -> Result<Table, ConvertError> {
    let bytes = std::fs::read(path).map_err(|e| ConvertError::io(path, e))?;
    parse_table(&bytes, options, path)
}

/// Parses an in-memory table. `path` is only used in error messages.
pub(crate) fn parse_table(
    bytes: &[u8],
    options: &ParseOptions,
    path: &Utf8Path,
) -> Result<Table, ConvertError> {
    let quote = ascii_byte(options.quote, "quote", path)?;
    let comment = options
        .comment
        .map(|c| ascii_byte(c, "comment", path))
        .transpose()?;
    let delimiter = match options.delimiter {
        Some(c) => ascii_byte(c, "delimiter", path)?,
        None => detect_delimiter(bytes, quote, comment),
    };
    debug!(delimiter = %char::from(delimiter), "parsing table");

    // Row widths are checked here rather than by the parser so that rows
    // made only of delimiters and whitespace can be skipped first.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .quote(quote)
        .comment(comment)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ConvertError::parse(path, e))?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ConvertError::parse(path, e))?;
        let number = i + 1;
        if options.skip_empty_lines && record.iter().all(str::is_empty) {
            continue;
        }
        if record.len() != headers.len() {
            return Err(ConvertError::ragged_row(
                path,
                number,
                headers.len(),
                record.len(),
            ));
        }
        let cells = record.iter().map(str::to_owned).collect();
        rows.push(Row { number, cells });
    }

    Ok(Table { headers, rows })
}

fn ascii_byte(
    c: char,
    option: &str,
    path: &Utf8Path,
) -> Result<u8, ConvertError> {
    u8::try_from(c).ok().filter(u8::is_ascii).ok_or_else(|| {
        ConvertError::parse_options(
            path,
            format!("{option} {c:?} is not a single ASCII character"),
        )
    })
}

/// Picks the candidate delimiter that occurs most often, outside quotes, in
/// the first line that is neither blank nor a comment. Falls back to `,`.
fn detect_delimiter(bytes: &[u8], quote: u8, comment: Option<u8>) -> u8 {
    let header = bytes
        .split(|&b| b == b'\n')
        .find(|line| {
            !line.iter().all(u8::is_ascii_whitespace)
                && comment.is_none_or(|c| line.first() != Some(&c))
        })
        .unwrap_or_default();

    let mut counts = [0_usize; DELIMITER_CANDIDATES.len()];
    let mut quoted = false;
    for &b in header {
        if b == quote {
            quoted = !quoted;
        } else if !quoted {
            if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&d| d == b) {
                counts[i] += 1;
            }
        }
    }

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }
    DELIMITER_CANDIDATES[best]
}
