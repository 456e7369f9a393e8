//! Document model types for docquery.
//!
//! This crate provides the in-memory tree that query criteria compile into:
//! insertion-ordered documents, scalar and binary leaves, compiled regular
//! expression patterns, and the geo shapes accepted by spatial operators.
//! Everything here serializes through serde into the relaxed extended JSON
//! shape a document-database wire encoder expects.
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod error;
pub mod geo;
pub mod pattern;
pub mod types;
pub mod value;

pub use document::Document;
pub use error::PatternError;
pub use geo::{Circle, GeoBox, GeoJson, Point, Polygon, Shape};
pub use pattern::{PatternLimits, RegexPattern};
pub use types::JsonType;
pub use value::Value;
