//! Symbolic fields and the references they resolve to.

use std::fmt;

use docquery_model::Value;

use crate::error::{ResolveError, ResolveResult};

/// A field exposed to an aggregation stage.
///
/// `name` is what expressions refer to; `target` is the document path it
/// reads. They are equal unless the field was aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    target: String,
}

impl Field {
    /// A field whose name is also its target path.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            target: name.clone(),
            name,
        }
    }

    /// A field exposed as `name` that reads `target`.
    #[must_use]
    pub fn aliased(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    /// The exposed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The document path.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns `true` if the target addresses a nested member (`a.b`).
    #[must_use]
    pub fn is_dotted(&self) -> bool {
        self.target.contains('.')
    }

    /// First segment of the target path.
    #[must_use]
    pub fn root_segment(&self) -> &str {
        root_segment(&self.target)
    }

    pub(crate) fn validate(&self) -> ResolveResult<()> {
        if self.name.is_empty() || self.target.is_empty() {
            return Err(ResolveError::EmptyField);
        }
        Ok(())
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

pub(crate) fn root_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// A resolved reference, rendered the way aggregation expressions embed it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldReference {
    /// A document path, rendered `$a.b`.
    Path {
        /// Path segments.
        segments: Vec<String>,
    },
    /// A member of an expression variable, rendered `$$var.b`.
    Variable {
        /// The variable name.
        variable: String,
        /// Member path below the variable.
        segments: Vec<String>,
    },
}

impl FieldReference {
    /// A path reference for a dotted document path.
    #[must_use]
    pub fn path(path: &str) -> Self {
        Self::Path {
            segments: path.split('.').map(str::to_owned).collect(),
        }
    }

    /// Reclassify as a variable reference: the first path segment names the
    /// variable. Variable references are returned unchanged.
    #[must_use]
    pub fn into_variable(self) -> Self {
        match self {
            Self::Path { segments } => {
                let mut segments = segments.into_iter();
                let variable = segments.next().unwrap_or_default();
                Self::Variable {
                    variable,
                    segments: segments.collect(),
                }
            }
            variable @ Self::Variable { .. } => variable,
        }
    }

    /// Returns `true` for variable references.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable { .. })
    }

    /// The dotted path without any `$` prefix.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Path { segments } => segments.join("."),
            Self::Variable { variable, segments } => std::iter::once(variable.as_str())
                .chain(segments.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join("."),
        }
    }

    /// The rendered reference as a document value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl fmt::Display for FieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { .. } => write!(f, "${}", self.raw()),
            Self::Variable { .. } => write!(f, "$${}", self.raw()),
        }
    }
}
