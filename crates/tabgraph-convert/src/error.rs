//! Error types for the tabgraph-convert crate.

use std::backtrace::Backtrace;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tabgraph_gexf::GexfError;
use tabgraph_schemas::TableKind;

/// Error type for table conversion.
///
/// Every failure is fatal for the conversion that produced it. Uses the
/// canonical struct pattern with backtrace capture and `is_xxx()` helper
/// methods.
#[derive(Debug)]
pub struct ConvertError {
    kind: ConvertErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum ConvertErrorKind {
    /// The column schema does not fit the table or is malformed.
    Schema { table: TableKind, message: String },
    /// A cell failed coercion to its declared type.
    Value {
        table: TableKind,
        column: String,
        row: usize,
        value: String,
        expected: String,
    },
    /// Reading a table or writing the document failed.
    Io { path: Utf8PathBuf, source: io::Error },
    /// The delimited-text parser rejected the file.
    Parse { path: Utf8PathBuf, source: csv::Error },
    /// A data row has a different number of fields than the header.
    RaggedRow {
        path: Utf8PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The parse options cannot be handed to the parser.
    ParseOptions { path: Utf8PathBuf, message: String },
    /// A record does not fit the schema it is assembled with.
    RecordMismatch {
        table: TableKind,
        row: usize,
        column: String,
    },
    /// The graph document rejected a node, edge, or attribute model.
    Assembly(GexfError),
}

impl ConvertError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: ConvertErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    pub(crate) fn schema(table: TableKind, message: impl Into<String>) -> Self {
        Self::new(ConvertErrorKind::Schema {
            table,
            message: message.into(),
        })
    }

    pub(crate) fn value(
        table: TableKind,
        column: &str,
        row: usize,
        value: &str,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(ConvertErrorKind::Value {
            table,
            column: column.to_owned(),
            row,
            value: value.to_owned(),
            expected: expected.into(),
        })
    }

    pub(crate) fn io(path: &Utf8Path, source: io::Error) -> Self {
        Self::new(ConvertErrorKind::Io {
            path: path.to_owned(),
            source,
        })
    }

    pub(crate) fn parse(path: &Utf8Path, source: csv::Error) -> Self {
        Self::new(ConvertErrorKind::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub(crate) fn ragged_row(
        path: &Utf8Path,
        row: usize,
        expected: usize,
        found: usize,
    ) -> Self {
        Self::new(ConvertErrorKind::RaggedRow {
            path: path.to_owned(),
            row,
            expected,
            found,
        })
    }

    pub(crate) fn parse_options(
        path: &Utf8Path,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ConvertErrorKind::ParseOptions {
            path: path.to_owned(),
            message: message.into(),
        })
    }

    /// Returns true if the column schema was rejected.
    pub fn is_schema(&self) -> bool {
        matches!(self.kind, ConvertErrorKind::Schema { .. })
    }

    pub(crate) fn record_mismatch(
        table: TableKind,
        row: usize,
        column: &str,
    ) -> Self {
        Self::new(ConvertErrorKind::RecordMismatch {
            table,
            row,
            column: column.to_owned(),
        })
    }

    /// Returns true if a cell value failed coercion.
    pub fn is_value(&self) -> bool {
        matches!(self.kind, ConvertErrorKind::Value { .. })
    }

    /// Returns true if reading a table or writing the document failed.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ConvertErrorKind::Io { .. })
    }

    /// Returns true if a table could not be parsed as delimited text.
    pub fn is_parse(&self) -> bool {
        matches!(
            self.kind,
            ConvertErrorKind::Parse { .. }
                | ConvertErrorKind::RaggedRow { .. }
                | ConvertErrorKind::ParseOptions { .. }
        )
    }

    /// Returns true if the graph document rejected the assembled data, or
    /// a record did not fit its schema.
    pub fn is_assembly(&self) -> bool {
        matches!(
            self.kind,
            ConvertErrorKind::Assembly(_)
                | ConvertErrorKind::RecordMismatch { .. }
        )
    }

    /// Returns the table the error concerns, when there is one.
    pub fn table(&self) -> Option<TableKind> {
        match &self.kind {
            ConvertErrorKind::Schema { table, .. }
            | ConvertErrorKind::Value { table, .. }
            | ConvertErrorKind::RecordMismatch { table, .. } => Some(*table),
            _ => None,
        }
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for ConvertErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertErrorKind::Schema { table, message } => {
                write!(f, "invalid {table} schema: {message}")
            }
            ConvertErrorKind::Value {
                table,
                column,
                row,
                value,
                expected,
            } => write!(
                f,
                "invalid value {value:?} in {table} column {column:?} \
                 (row {row}): expected {expected}"
            ),
            ConvertErrorKind::Io { path, source } => {
                write!(f, "I/O error on {path}: {source}")
            }
            ConvertErrorKind::Parse { path, source } => {
                write!(f, "failed to parse {path}: {source}")
            }
            ConvertErrorKind::RaggedRow {
                path,
                row,
                expected,
                found,
            } => write!(
                f,
                "failed to parse {path}: row {row} has {found} fields, \
                 but the header has {expected}"
            ),
            ConvertErrorKind::ParseOptions { path, message } => {
                write!(f, "invalid parse options for {path}: {message}")
            }
            ConvertErrorKind::RecordMismatch { table, row, column } => write!(
                f,
                "{table} record {row} has no usable value for column {column:?}"
            ),
            ConvertErrorKind::Assembly(err) => {
                write!(f, "failed to assemble graph: {err}")
            }
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summary of what happened.
        writeln!(f, "{}", self.kind)?;

        // Backtrace (will be empty unless RUST_BACKTRACE is set).
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ConvertErrorKind::Io { source, .. } => Some(source),
            ConvertErrorKind::Parse { source, .. } => Some(source),
            ConvertErrorKind::Assembly(err) => Some(err),
            ConvertErrorKind::Schema { .. }
            | ConvertErrorKind::Value { .. }
            | ConvertErrorKind::RaggedRow { .. }
            | ConvertErrorKind::ParseOptions { .. }
            | ConvertErrorKind::RecordMismatch { .. } => None,
        }
    }
}

impl From<GexfError> for ConvertError {
    fn from(err: GexfError) -> Self {
        Self::new(ConvertErrorKind::Assembly(err))
    }
}
