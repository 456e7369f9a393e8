//! Query criteria compilation and aggregation field resolution for docquery.
//!
//! - [`criteria`]: the [`Criteria`] builder and the compiler that turns a chain
//!   of keyed predicates into a criteria [`Document`](docquery_model::Document).
//! - [`aggregation`]: nested resolution scopes that classify symbolic fields
//!   as document paths (`$field`) or expression variables (`$$var`).
//!
//! Builders are plain owned values. Mutation goes through `&mut`, so a
//! builder shared across threads must be frozen (or externally locked) before
//! concurrent `compile` calls, which only read.
#![allow(clippy::module_name_repetitions)]

pub mod aggregation;
pub mod config;
pub mod criteria;
pub mod error;

pub use aggregation::{Field, FieldReference, RootContext, Scope};
pub use config::QueryConfig;
pub use criteria::{Bitmask, BitwiseOperators, Combinator, Criteria, Operator};
pub use error::{CriteriaError, CriteriaResult, ResolveError, ResolveResult};
