//! Schema-driven conversion of node and edge tables into GEXF documents.
//!
//! This crate is the core of the tabgraph pipeline. Each table goes through
//! the same stages before the two meet in the assembler:
//!
//! 1. Load: read the delimited text file into a header and raw rows
//! 2. Validate: check the column schema against the header and normalize it
//! 3. Coerce: convert every cell to the type its column declares
//! 4. Assemble: derive the attribute models and populate a [`Gexf`]
//!
//! [`convert`] runs the whole pipeline from a [`ConversionConfig`] and
//! optionally saves the document.
//!
//! ## Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use tabgraph_convert::{Conversion, convert};
//! use tabgraph_schemas::ConversionConfig;
//!
//! let config = ConversionConfig::from_path(Utf8Path::new("graph.json")).unwrap();
//! match convert(&config).unwrap() {
//!     Conversion::Document(gexf) => println!("{}", gexf.to_xml_string().unwrap()),
//!     Conversion::Saved(path) => println!("wrote {path}"),
//! }
//! ```

mod assemble;
mod coerce;
mod error;
mod load;
mod model;
mod schema;

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tabgraph_gexf::Gexf;
use tabgraph_schemas::{
    ColumnSchema, ConversionConfig, TableConfig, TableKind,
};
use tracing::{debug_span, error, info, info_span, instrument};

#[doc(inline)]
pub use crate::assemble::assemble;
#[doc(inline)]
pub use crate::coerce::{Record, Value, coerce_rows};
#[doc(inline)]
pub use crate::error::ConvertError;
#[doc(inline)]
pub use crate::load::{Row, Table, load_table};
#[doc(inline)]
pub use crate::model::derive_attribute_model;
#[doc(inline)]
pub use crate::schema::validate_schema;

/// A table that has been loaded, validated, and coerced.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub schema: ColumnSchema,
    pub records: Vec<Record>,
}

/// The result of a successful conversion.
#[derive(Debug)]
pub enum Conversion {
    /// No output path was configured; the caller gets the document.
    Document(Gexf),
    /// The document was written to this path.
    Saved(Utf8PathBuf),
}

/// Loads, validates, and coerces one table.
///
/// # Errors
///
/// Returns [`ConvertError`] if the file cannot be read or parsed, the schema
/// does not fit the table, or a cell does not fit its column.
#[instrument(skip_all, fields(table = %kind, file = %config.file))]
pub fn load(
    config: &TableConfig,
    kind: TableKind,
) -> Result<LoadedTable, ConvertError> {
    let table = load_table(&config.file, &config.parse_options)?;
    let schema = validate_schema(&table.headers, &config.schema, kind)?;
    let records = coerce_rows(table.rows, &schema)?;
    info!(rows = records.len(), columns = schema.len(), "loaded {kind} table");
    Ok(LoadedTable { schema, records })
}

/// Runs a full conversion.
///
/// The node and edge tables are loaded in parallel; both must succeed before
/// assembly starts. When `save_as` is configured the document is written
/// there and its path returned, otherwise the document itself is returned.
///
/// # Errors
///
/// Returns the first [`ConvertError`] of the pipeline. When both tables fail
/// to load, the node table's error is returned. The error is also logged.
pub fn convert(config: &ConversionConfig) -> Result<Conversion, ConvertError> {
    let _span = info_span!("convert").entered();

    let result = run(config);
    if let Err(err) = &result {
        error!(table = ?err.table(), "conversion failed: {err}");
    }
    result
}

fn run(config: &ConversionConfig) -> Result<Conversion, ConvertError> {
    // Step 1: Load both tables.
    let (nodes, edges) = rayon::join(
        || load(&config.nodes, TableKind::Node),
        || load(&config.edges, TableKind::Edge),
    );
    let nodes = nodes?;
    let edges = edges?;

    // Step 2: Assemble the document.
    let gexf = assemble(nodes, edges, &config.graph_params)?;

    // Step 3: Persist it if asked to.
    match &config.save_as {
        Some(path) => {
            save(&gexf, path)?;
            Ok(Conversion::Saved(path.clone()))
        }
        None => Ok(Conversion::Document(gexf)),
    }
}

/// Writes `gexf` to `path` as pretty-printed XML, replacing any existing
/// file.
///
/// # Errors
///
/// Returns an I/O error ([`ConvertError::is_io`]) naming `path`.
pub fn save(gexf: &Gexf, path: &Utf8Path) -> Result<(), ConvertError> {
    let _span = debug_span!("save", %path).entered();

    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut out = BufWriter::new(file);
    gexf.write_to(&mut out)
        .and_then(|()| out.flush())
        .map_err(|e| ConvertError::io(path, e))?;

    info!(%path, "saved document");
    Ok(())
}
