//! Conversion configuration: which tables to read, how their columns map
//! onto the graph, and where to write the result.
//!
//! The configuration is a JSON file with camelCase keys. See
//! `tabgraph config-schema` for the generated JSON Schema.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::column_schema::RawSchemaElement;
use crate::vocabulary::EdgeType;

/// Everything needed for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionConfig {
    /// Graph-wide settings copied into the document header.
    pub graph_params: GraphParams,
    /// The node table.
    pub nodes: TableConfig,
    /// The edge table.
    pub edges: TableConfig,
    /// Where to write the document. When absent, the conversion returns the
    /// in-memory document instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub save_as: Option<Utf8PathBuf>,
}

impl ConversionConfig {
    /// Loads a configuration from a JSON file.
    pub fn from_path(path: &Utf8Path) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Rebases every relative path in the configuration onto `base`.
    ///
    /// Used by the CLI so that table paths are relative to the directory of
    /// the configuration file rather than the working directory.
    pub fn resolve_relative_to(&mut self, base: &Utf8Path) {
        let rebase = |path: &mut Utf8PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        rebase(&mut self.nodes.file);
        rebase(&mut self.edges.file);
        if let Some(save_as) = &mut self.save_as {
            rebase(save_as);
        }
    }
}

/// Graph-wide parameters.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct GraphParams {
    /// Edge type for edges that do not carry their own.
    pub default_edge_type: EdgeType,
    /// Document metadata. `lastmodifieddate` is written as an attribute of
    /// the `<meta>` element; every other key becomes a child element
    /// (`creator`, `description`, `keywords`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl GraphParams {
    /// Key of the metadata entry stored as an attribute of `<meta>`.
    pub const LAST_MODIFIED: &'static str = "lastmodifieddate";

    /// Parameters with the given default edge type and no metadata.
    pub fn new(default_edge_type: EdgeType) -> Self {
        Self {
            default_edge_type,
            meta: BTreeMap::new(),
        }
    }

    /// The `lastmodifieddate` metadata entry, if set.
    pub fn last_modified(&self) -> Option<&str> {
        self.meta.get(Self::LAST_MODIFIED).map(String::as_str)
    }

    /// Metadata entries other than the last-modified date, sorted by key.
    pub fn meta_elements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta
            .iter()
            .filter(|(k, _)| k.as_str() != Self::LAST_MODIFIED)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One input table and its column schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// Path of the delimited text file.
    #[schemars(with = "String")]
    pub file: Utf8PathBuf,
    /// One element per column, in column order.
    pub schema: Vec<RawSchemaElement>,
    #[serde(default)]
    pub parse_options: ParseOptions,
}

/// Options handed to the delimited-text parser.
///
/// Unknown keys are ignored so configurations written for other parsers
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Field delimiter. Detected from the header line when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    pub quote: char,
    /// Lines starting with this character are ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<char>,
    /// Strip surrounding whitespace from headers and fields.
    pub trim: bool,
    /// Drop rows whose fields are all empty.
    pub skip_empty_lines: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: '"',
            comment: None,
            trim: true,
            skip_empty_lines: true,
        }
    }
}
