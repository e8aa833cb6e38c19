//! Schema definitions shared by the tabgraph pipeline.
//!
//! This crate holds the contracts every phase agrees on:
//! - the JSON conversion configuration ([`ConversionConfig`]),
//! - raw and normalized column schemas ([`RawSchemaElement`],
//!   [`ColumnSchema`]),
//! - the closed visualization vocabulary ([`Color`], [`NodeShape`],
//!   [`EdgeShape`], [`EdgeType`]),
//! - attribute model entries ([`AttributeDef`]) embedded in documents.

mod column_schema;
mod config;
mod vocabulary;

#[doc(inline)]
pub use column_schema::*;
#[doc(inline)]
pub use config::*;
#[doc(inline)]
pub use vocabulary::*;
