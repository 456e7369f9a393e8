//! Base resolution against the document model.

use std::collections::HashSet;

use docquery_model::{Document, Value};
use indexmap::IndexMap;

use super::field::{Field, FieldReference, root_segment};
use crate::error::{ResolveError, ResolveResult};

/// The outermost link of a scope chain.
///
/// Validates references against the fields a stage exposes (when
/// restricted) and renames property names to stored field names.
#[derive(Debug, Clone, Default)]
pub struct RootContext {
    exposed: Option<HashSet<String>>,
    mappings: IndexMap<String, String>,
}

impl RootContext {
    /// A context accepting any field, without renames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that only accepts fields whose root segment is one of `fields`.
    #[must_use]
    pub fn exposing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exposed: Some(fields.into_iter().map(Into::into).collect()),
            mappings: IndexMap::new(),
        }
    }

    /// Store `property` under `field` in documents.
    #[must_use]
    pub fn with_mapping(mut self, property: impl Into<String>, field: impl Into<String>) -> Self {
        self.mappings.insert(property.into(), field.into());
        self
    }

    /// Resolve a field to a path reference.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::EmptyField`] for an empty name or target and
    /// [`ResolveError::InvalidReference`] for a field this context does not
    /// expose.
    pub fn resolve_field(&self, field: &Field) -> ResolveResult<FieldReference> {
        field.validate()?;
        let exposed = self
            .exposed
            .as_ref()
            .is_none_or(|exposed| exposed.contains(root_segment(field.name())));
        if !exposed {
            return Err(ResolveError::InvalidReference {
                field: field.target().to_owned(),
            });
        }
        Ok(FieldReference::path(&self.map_path(field.target())))
    }

    /// Resolve a bare name.
    pub fn resolve_name(&self, name: &str) -> ResolveResult<FieldReference> {
        self.resolve_field(&Field::new(name))
    }

    /// Rename field keys throughout `document`. Operator keys (`$...`) are kept.
    #[must_use]
    pub fn map_document(&self, document: &Document) -> Document {
        document
            .iter()
            .map(|(key, value)| {
                let key = if key.starts_with('$') {
                    key.clone()
                } else {
                    self.map_path(key)
                };
                (key, self.map_value(value))
            })
            .collect()
    }

    fn map_value(&self, value: &Value) -> Value {
        match value {
            Value::Document(document) => Value::Document(self.map_document(document)),
            Value::Array(values) => Value::Array(values.iter().map(|v| self.map_value(v)).collect()),
            other => other.clone(),
        }
    }

    fn map_path(&self, path: &str) -> String {
        let root = root_segment(path);
        match self.mappings.get(root) {
            Some(mapped) => format!("{mapped}{}", &path[root.len()..]),
            None => path.to_owned(),
        }
    }
}
