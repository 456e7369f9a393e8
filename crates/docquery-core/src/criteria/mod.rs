//! Fluent criteria builder.
//!
//! A [`Criteria`] owns an append-only chain of [`CriteriaNode`]s and a cursor
//! to the *active* node that operator calls write into. [`Criteria::field`]
//! starts a chain on a field, [`Criteria::and`] appends a node for another
//! field, and the boolean combinators append a node holding the compiled
//! documents of other builders.
//!
//! Builder methods take `&mut self` and validate before mutating, so a call
//! that returns an error leaves the builder exactly as it was.
//!
//! ```
//! use docquery_core::Criteria;
//!
//! let mut criteria = Criteria::field("age");
//! criteria.gte(18).lt(65);
//! criteria.and("status")?.is("active")?;
//!
//! assert_eq!(
//!     criteria.compile()?.to_string(),
//!     r#"{"age":{"$gte":18,"$lt":65},"status":"active"}"#
//! );
//! # Ok::<(), docquery_core::CriteriaError>(())
//! ```

mod bits;
mod compile;
mod node;

use std::hash::{Hash, Hasher};

use docquery_model::{Circle, Document, GeoJson, JsonType, RegexPattern, Shape, Value};
use tracing::debug;

pub use bits::{Bitmask, BitwiseOperators};
pub use node::{Combinator, CriteriaNode, Equality, NodeTarget, Operator, OperatorValue};

use crate::error::{CriteriaError, CriteriaResult};

/// A chain of field predicates compiled into a criteria document.
///
/// Two builders are equal when their chains are equal node by node; the
/// active-node cursor does not take part.
#[derive(Debug, Clone)]
pub struct Criteria {
    chain: Vec<CriteriaNode>,
    active: usize,
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new()
    }
}

impl Criteria {
    /// Start a keyless chain, typically followed by a combinator such as
    /// [`or_operator`](Self::or_operator).
    #[must_use]
    pub fn new() -> Self {
        Self::starting_with(NodeTarget::Root)
    }

    /// Start a chain predicating on `key`.
    #[doc(alias = "where")]
    #[must_use]
    pub fn field(key: impl Into<String>) -> Self {
        Self::starting_with(NodeTarget::Field(key.into()))
    }

    /// Start a keyless chain matching documents against a `$jsonSchema`.
    #[must_use]
    pub fn matching_document_structure(schema: Document) -> Self {
        let mut criteria = Self::new();
        criteria
            .active_mut()
            .put(Operator::JsonSchema, Value::Document(schema));
        criteria
    }

    fn starting_with(target: NodeTarget) -> Self {
        Self {
            chain: vec![CriteriaNode::new(target)],
            active: 0,
        }
    }

    /// The key of the active node.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.active().key()
    }

    /// The nodes of the chain in order.
    #[must_use]
    pub fn nodes(&self) -> &[CriteriaNode] {
        &self.chain
    }

    fn active(&self) -> &CriteriaNode {
        &self.chain[self.active]
    }

    pub(crate) fn active_mut(&mut self) -> &mut CriteriaNode {
        &mut self.chain[self.active]
    }

    /// Append a node for `key` and make it the active node.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::IllegalNesting`] if the active node ends with
    /// a bare `not()`.
    pub fn and(&mut self, key: impl Into<String>) -> CriteriaResult<&mut Self> {
        let key = key.into();
        if self.active().has_dangling_not() {
            return Err(CriteriaError::IllegalNesting {
                message: format!("operator $not is not allowed around chain element '{key}'"),
            });
        }
        self.chain.push(CriteriaNode::new(NodeTarget::Field(key)));
        self.active = self.chain.len() - 1;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Equality
    // -----------------------------------------------------------------------

    /// Require the field to equal `value`. `Value::Null` matches null or
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::ConflictingAssignment`] if an equality value is
    /// already set on the active node, or if it ends with a bare `not()`.
    pub fn is(&mut self, value: impl Into<Value>) -> CriteriaResult<&mut Self> {
        let node = self.active();
        if matches!(node.equality, Equality::Value(_)) {
            return Err(CriteriaError::ConflictingAssignment {
                message: "multiple 'is' values declared; use 'and' with multiple criteria"
                    .to_owned(),
            });
        }
        if node.has_dangling_not() {
            return Err(CriteriaError::ConflictingAssignment {
                message: "'not' can't be used with 'is'; use 'not_equal' instead".to_owned(),
            });
        }
        self.active_mut().equality = Equality::Value(value.into());
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Comparison and membership
    // -----------------------------------------------------------------------

    /// `$ne`. Named apart from [`PartialEq::ne`], which `Criteria` also has.
    #[doc(alias = "ne")]
    pub fn not_equal(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(Operator::Ne, value.into())
    }

    /// `$lt`.
    pub fn lt(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(Operator::Lt, value.into())
    }

    /// `$lte`.
    pub fn lte(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(Operator::Lte, value.into())
    }

    /// `$gt`.
    pub fn gt(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(Operator::Gt, value.into())
    }

    /// `$gte`.
    pub fn gte(&mut self, value: impl Into<Value>) -> &mut Self {
        self.put(Operator::Gte, value.into())
    }

    /// `$in`.
    ///
    /// A single array argument is taken as the candidate list itself, so
    /// `is_in([1, 2, 3])` and `is_in([vec![1, 2, 3]])` record the same value.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::AmbiguousArgument`] if the second argument is
    /// an array.
    pub fn is_in<I, V>(&mut self, values: I) -> CriteriaResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = collect_values(Operator::In, values)?;
        Ok(self.put(Operator::In, Value::Array(values)))
    }

    /// `$nin`, with the same argument rules as [`is_in`](Self::is_in).
    pub fn not_in<I, V>(&mut self, values: I) -> CriteriaResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = collect_values(Operator::Nin, values)?;
        Ok(self.put(Operator::Nin, Value::Array(values)))
    }

    /// `$all`, with the same argument rules as [`is_in`](Self::is_in).
    pub fn all<I, V>(&mut self, values: I) -> CriteriaResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = collect_values(Operator::All, values)?;
        Ok(self.put(Operator::All, Value::Array(values)))
    }

    /// `$mod`: `field % divisor == remainder`.
    pub fn modulo(&mut self, divisor: impl Into<Value>, remainder: impl Into<Value>) -> &mut Self {
        self.put(
            Operator::Mod,
            Value::Array(vec![divisor.into(), remainder.into()]),
        )
    }

    /// `$size`: array length.
    pub fn size(&mut self, size: i32) -> &mut Self {
        self.put(Operator::Size, Value::Int32(size))
    }

    /// `$exists`.
    pub fn exists(&mut self, exists: bool) -> &mut Self {
        self.put(Operator::Exists, Value::Bool(exists))
    }

    /// `$type` with a numeric type code.
    pub fn type_number(&mut self, code: i32) -> &mut Self {
        self.put(Operator::Type, Value::Int32(code))
    }

    /// `$type` with a list of type aliases.
    pub fn type_of(&mut self, types: &[JsonType]) -> &mut Self {
        let aliases = types.iter().map(|t| Value::from(t.as_str())).collect();
        self.put(Operator::Type, Value::Array(aliases))
    }

    // -----------------------------------------------------------------------
    // Negation and patterns
    // -----------------------------------------------------------------------

    /// Negate the next operator recorded on the active node.
    pub fn not(&mut self) -> &mut Self {
        self.active_mut().put(Operator::Not, OperatorValue::Negation);
        self
    }

    /// Match against a regular expression without options.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::Pattern`] if the pattern does not compile.
    pub fn regex(&mut self, source: &str) -> CriteriaResult<&mut Self> {
        self.regex_with_options(source, "")
    }

    /// Match against a regular expression with options such as `"i"`.
    pub fn regex_with_options(&mut self, source: &str, options: &str) -> CriteriaResult<&mut Self> {
        let pattern = RegexPattern::with_options(source, options)?;
        Ok(self.regex_pattern(pattern))
    }

    /// Match against a compiled pattern.
    ///
    /// The pattern becomes the equality value, or the `$not` operand if a bare
    /// `not()` is pending.
    pub fn regex_pattern(&mut self, pattern: RegexPattern) -> &mut Self {
        let node = self.active_mut();
        if node.has_dangling_not() {
            node.put(Operator::Not, Value::Regex(pattern));
        } else {
            node.equality = Equality::Value(Value::Regex(pattern));
        }
        self
    }

    // -----------------------------------------------------------------------
    // Geo
    // -----------------------------------------------------------------------

    /// `$near` a point (legacy pair or GeoJSON point).
    pub fn near(&mut self, point: impl Into<Shape>) -> &mut Self {
        self.active_mut()
            .put(Operator::Near, OperatorValue::Shape(point.into()));
        self
    }

    /// `$nearSphere` a point.
    pub fn near_sphere(&mut self, point: impl Into<Shape>) -> &mut Self {
        self.active_mut()
            .put(Operator::NearSphere, OperatorValue::Shape(point.into()));
        self
    }

    /// `$geoWithin` a shape.
    pub fn within(&mut self, shape: impl Into<Shape>) -> &mut Self {
        self.active_mut()
            .put(Operator::GeoWithin, OperatorValue::Command(shape.into()));
        self
    }

    /// `$geoWithin` a spherical circle (`$centerSphere`).
    pub fn within_sphere(&mut self, circle: Circle) -> &mut Self {
        self.active_mut()
            .put(Operator::GeoWithin, OperatorValue::Command(Shape::Sphere(circle)));
        self
    }

    /// `$geoIntersects` a GeoJSON geometry.
    pub fn intersects(&mut self, geometry: GeoJson) -> &mut Self {
        self.active_mut().put(
            Operator::GeoIntersects,
            OperatorValue::Shape(Shape::GeoJson(geometry)),
        );
        self
    }

    /// Attach `$maxDistance` to the node's near operator, or record it
    /// standalone when there is no near operator that can carry it.
    pub fn max_distance(&mut self, distance: f64) -> &mut Self {
        self.attach_distance(Operator::MaxDistance, distance);
        self
    }

    /// Attach `$minDistance`; see [`max_distance`](Self::max_distance).
    pub fn min_distance(&mut self, distance: f64) -> &mut Self {
        self.attach_distance(Operator::MinDistance, distance);
        self
    }

    fn attach_distance(&mut self, bound: Operator, distance: f64) {
        let node = self.active_mut();
        for near in [Operator::Near, Operator::NearSphere] {
            let Some(existing) = node.operators.get_mut(&near) else {
                continue;
            };
            match existing {
                OperatorValue::Value(Value::Document(doc)) => {
                    doc.insert(bound.as_str(), distance);
                    return;
                }
                OperatorValue::Shape(Shape::GeoJson(geometry)) => {
                    let augmented = geometry.to_geometry().with(bound.as_str(), distance);
                    *existing = OperatorValue::Value(Value::Document(augmented));
                    return;
                }
                _ => {}
            }
        }
        debug!(%bound, distance, "no near operator to augment; recording distance standalone");
        node.put(bound, Value::Double(distance));
    }

    // -----------------------------------------------------------------------
    // Embedded criteria
    // -----------------------------------------------------------------------

    /// `$elemMatch` with the compiled document of another builder.
    ///
    /// # Errors
    ///
    /// Propagates compile errors of `criteria`.
    pub fn elem_match(&mut self, criteria: &Self) -> CriteriaResult<&mut Self> {
        let document = criteria.compile()?;
        Ok(self.put(Operator::ElemMatch, Value::Document(document)))
    }

    /// Add a `$jsonSchema` node to the chain.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::IllegalNesting`] after a bare `not()`.
    pub fn and_document_structure_matches(&mut self, schema: Document) -> CriteriaResult<&mut Self> {
        let mut node = CriteriaNode::new(NodeTarget::Root);
        node.put(Operator::JsonSchema, Value::Document(schema));
        self.register_chain_element(node)
    }

    /// Append an `$and` over the given criteria.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::IllegalNesting`] after a bare `not()`, or the
    /// compile error of any argument.
    pub fn and_operator(&mut self, criteria: &[Self]) -> CriteriaResult<&mut Self> {
        self.combine(Combinator::And, criteria)
    }

    /// Append an `$or` over the given criteria.
    pub fn or_operator(&mut self, criteria: &[Self]) -> CriteriaResult<&mut Self> {
        self.combine(Combinator::Or, criteria)
    }

    /// Append a `$nor` over the given criteria.
    pub fn nor_operator(&mut self, criteria: &[Self]) -> CriteriaResult<&mut Self> {
        self.combine(Combinator::Nor, criteria)
    }

    /// Bitwise operators writing into the active node.
    pub fn bits(&mut self) -> BitwiseOperators<'_> {
        BitwiseOperators::new(self)
    }

    fn combine(&mut self, combinator: Combinator, criteria: &[Self]) -> CriteriaResult<&mut Self> {
        let documents = criteria
            .iter()
            .map(Self::compile)
            .collect::<CriteriaResult<Vec<_>>>()?;
        self.register_chain_element(CriteriaNode::combinator(combinator, documents))
    }

    /// Append a node without moving the active cursor.
    fn register_chain_element(&mut self, node: CriteriaNode) -> CriteriaResult<&mut Self> {
        if self.active().has_dangling_not() {
            return Err(CriteriaError::IllegalNesting {
                message: format!(
                    "operator $not is not allowed around criteria chain element: {}",
                    node.compile()
                ),
            });
        }
        self.chain.push(node);
        Ok(self)
    }

    fn put(&mut self, operator: Operator, value: Value) -> &mut Self {
        self.active_mut().put(operator, value);
        self
    }
}

/// Normalize a multi-value argument list.
fn collect_values<I, V>(operator: Operator, values: I) -> CriteriaResult<Vec<Value>>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let mut values: Vec<Value> = values.into_iter().map(Into::into).collect();
    if values.len() > 1 && values[1].is_array() {
        return Err(CriteriaError::AmbiguousArgument {
            operator: operator.to_string(),
            message: "only a single collection argument may be passed".to_owned(),
        });
    }
    if values.len() == 1 && values[0].is_array() {
        if let Some(Value::Array(inner)) = values.pop() {
            return Ok(inner);
        }
    }
    Ok(values)
}

impl PartialEq for Criteria {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain
    }
}

impl Eq for Criteria {}

impl Hash for Criteria {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain.hash(state);
    }
}
