//! Chain node types: operators, node targets, equality state, and operator values.

use std::fmt;
use std::hash::{Hash, Hasher};

use docquery_model::{Document, Shape, Value};
use indexmap::IndexMap;

/// Query operators a node can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$not`: negates the operator recorded after it.
    Not,
    /// `$ne`.
    Ne,
    /// `$lt`.
    Lt,
    /// `$lte`.
    Lte,
    /// `$gt`.
    Gt,
    /// `$gte`.
    Gte,
    /// `$in`.
    In,
    /// `$nin`.
    Nin,
    /// `$mod`.
    Mod,
    /// `$all`.
    All,
    /// `$size`.
    Size,
    /// `$exists`.
    Exists,
    /// `$type`.
    Type,
    /// `$elemMatch`.
    ElemMatch,
    /// `$near`.
    Near,
    /// `$nearSphere`.
    NearSphere,
    /// `$geoWithin`.
    GeoWithin,
    /// `$geoIntersects`.
    GeoIntersects,
    /// `$maxDistance`.
    MaxDistance,
    /// `$minDistance`.
    MinDistance,
    /// `$bitsAllClear`.
    BitsAllClear,
    /// `$bitsAllSet`.
    BitsAllSet,
    /// `$bitsAnyClear`.
    BitsAnyClear,
    /// `$bitsAnySet`.
    BitsAnySet,
    /// `$jsonSchema`.
    JsonSchema,
}

impl Operator {
    /// The operator key as it appears in a compiled document.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Not => "$not",
            Self::Ne => "$ne",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Mod => "$mod",
            Self::All => "$all",
            Self::Size => "$size",
            Self::Exists => "$exists",
            Self::Type => "$type",
            Self::ElemMatch => "$elemMatch",
            Self::Near => "$near",
            Self::NearSphere => "$nearSphere",
            Self::GeoWithin => "$geoWithin",
            Self::GeoIntersects => "$geoIntersects",
            Self::MaxDistance => "$maxDistance",
            Self::MinDistance => "$minDistance",
            Self::BitsAllClear => "$bitsAllClear",
            Self::BitsAllSet => "$bitsAllSet",
            Self::BitsAnyClear => "$bitsAnyClear",
            Self::BitsAnySet => "$bitsAnySet",
            Self::JsonSchema => "$jsonSchema",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinators that aggregate other compiled criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// `$and`.
    And,
    /// `$or`.
    Or,
    /// `$nor`.
    Nor,
}

impl Combinator {
    /// The combinator key as it appears in a compiled document.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
            Self::Nor => "$nor",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node predicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeTarget {
    /// No field key; operators compile at the top level.
    Root,
    /// A document field path.
    Field(String),
    /// A boolean combinator over other criteria.
    Combinator(Combinator),
}

impl NodeTarget {
    /// The top-level key this node compiles under, if any.
    ///
    /// An empty or whitespace-only field path counts as keyless.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Field(key) if key.trim().is_empty() => None,
            Self::Field(key) => Some(key),
            Self::Combinator(c) => Some(c.as_str()),
        }
    }
}

/// Equality state of a node. `Value(Value::Null)` is a real null match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Equality {
    /// No equality value recorded.
    #[default]
    Unset,
    /// Field must equal this value.
    Value(Value),
}

/// The value side of an operator entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperatorValue {
    /// A bare `$not` waiting for the next operator to wrap.
    Negation,
    /// A plain document value.
    Value(Value),
    /// A shape used directly as operand (`$near`, `$nearSphere`, `$geoIntersects`).
    Shape(Shape),
    /// A shape used as a `$geoWithin` command.
    Command(Shape),
}

impl OperatorValue {
    /// Returns `true` for a bare negation marker.
    #[must_use]
    pub fn is_negation(&self) -> bool {
        matches!(self, Self::Negation)
    }

    /// Render into the compiled document form, wrapping GeoJSON under `$geometry`.
    #[must_use]
    pub fn render(&self) -> Value {
        match self {
            Self::Negation => Value::Null,
            Self::Value(v) => v.clone(),
            Self::Shape(Shape::GeoJson(geo)) | Self::Command(Shape::GeoJson(geo)) => {
                Value::Document(geo.to_geometry())
            }
            Self::Shape(shape) => shape.to_value(),
            Self::Command(shape) => shape.to_command_value(),
        }
    }
}

impl From<Value> for OperatorValue {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// One keyed (or keyless, or combinator) unit of a criteria chain.
///
/// Equality is order-sensitive on operators: `{$not, $gt}` and `{$gt, $not}`
/// compile differently, so they are different nodes.
#[derive(Debug, Clone)]
pub struct CriteriaNode {
    pub(crate) target: NodeTarget,
    pub(crate) operators: IndexMap<Operator, OperatorValue>,
    pub(crate) equality: Equality,
}

impl PartialEq for CriteriaNode {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.equality == other.equality
            && self.operators.len() == other.operators.len()
            && self.operators.iter().eq(other.operators.iter())
    }
}

impl Eq for CriteriaNode {}

impl Hash for CriteriaNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.equality.hash(state);
        self.operators.len().hash(state);
        for entry in &self.operators {
            entry.hash(state);
        }
    }
}

impl CriteriaNode {
    pub(crate) fn new(target: NodeTarget) -> Self {
        Self {
            target,
            operators: IndexMap::new(),
            equality: Equality::Unset,
        }
    }

    pub(crate) fn combinator(combinator: Combinator, documents: Vec<Document>) -> Self {
        let mut node = Self::new(NodeTarget::Combinator(combinator));
        node.equality = Equality::Value(Value::Array(
            documents.into_iter().map(Value::Document).collect(),
        ));
        node
    }

    /// What this node predicates on.
    #[must_use]
    pub fn target(&self) -> &NodeTarget {
        &self.target
    }

    /// The field key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.target.key()
    }

    /// The recorded equality state.
    #[must_use]
    pub fn equality(&self) -> &Equality {
        &self.equality
    }

    /// Recorded operators in insertion order.
    pub fn operators(&self) -> impl Iterator<Item = (&Operator, &OperatorValue)> {
        self.operators.iter()
    }

    /// Returns `true` if the last recorded operator is a bare `$not`.
    #[must_use]
    pub fn has_dangling_not(&self) -> bool {
        matches!(self.operators.last(), Some((Operator::Not, OperatorValue::Negation)))
    }

    pub(crate) fn put(&mut self, operator: Operator, value: impl Into<OperatorValue>) {
        self.operators.insert(operator, value.into());
    }
}
