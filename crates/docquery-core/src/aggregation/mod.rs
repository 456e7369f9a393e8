//! Field reference resolution for aggregation expressions.
//!
//! Expressions such as `$map` or `$filter` bind variables over a nested
//! scope. Inside it, a field whose name (or dotted root segment) is one of
//! those bindings must render as a variable reference (`$$items.qty`), while
//! every other field keeps the document path reference (`$price`) the
//! enclosing stage would produce.
//!
//! ```
//! use docquery_core::{Field, RootContext, Scope};
//!
//! let stage = Scope::root(RootContext::new());
//! let inner = stage.nested(["items"]);
//!
//! assert_eq!(inner.resolve(&Field::new("items.qty"))?.to_string(), "$$items.qty");
//! assert_eq!(inner.resolve(&Field::new("price"))?.to_string(), "$price");
//! # Ok::<(), docquery_core::ResolveError>(())
//! ```

mod context;
mod field;
mod scope;

pub use context::RootContext;
pub use field::{Field, FieldReference};
pub use scope::Scope;
