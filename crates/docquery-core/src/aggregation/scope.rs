//! Nested resolution scopes.

use std::collections::HashSet;

use docquery_model::Document;
use tracing::trace;

use super::context::RootContext;
use super::field::{Field, FieldReference};
use crate::criteria::Criteria;
use crate::error::{CriteriaResult, ResolveError, ResolveResult};

/// A resolution scope: a set of locally bound names over a parent.
///
/// Inner scopes borrow their parent, so a chain lives no longer than its
/// outermost [`RootContext`].
#[derive(Debug)]
pub struct Scope<'p> {
    bindings: HashSet<String>,
    parent: Parent<'p>,
}

#[derive(Debug)]
enum Parent<'p> {
    Root(RootContext),
    Scope(&'p Scope<'p>),
}

impl Scope<'static> {
    /// The outermost scope, binding nothing.
    #[must_use]
    pub fn root(context: RootContext) -> Self {
        Self {
            bindings: HashSet::new(),
            parent: Parent::Root(context),
        }
    }
}

impl<'p> Scope<'p> {
    /// An inner scope binding `names`, e.g. the variables of a `$map` or `$let`.
    #[must_use]
    pub fn nested<'s, I, S>(&'s self, names: I) -> Scope<'s>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope {
            bindings: names.into_iter().map(Into::into).collect(),
            parent: Parent::Scope(self),
        }
    }

    /// Returns `true` if `name` is bound by this scope itself.
    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains(name)
    }

    /// Resolve a field through the chain.
    ///
    /// The parent answers first; a field this scope binds, either by name or
    /// as the root of a dotted target, is then reclassified as a variable
    /// reference.
    ///
    /// # Errors
    ///
    /// Propagates [`ResolveError`]s of the chain, except that a locally bound
    /// field unknown to the root context still resolves as a variable.
    pub fn resolve(&self, field: &Field) -> ResolveResult<FieldReference> {
        let resolved = match &self.parent {
            Parent::Root(context) => context.resolve_field(field),
            Parent::Scope(parent) => parent.resolve(field),
        };
        if !self.binds(field) {
            return resolved;
        }
        trace!(field = field.name(), target = field.target(), "resolved locally bound field as variable");
        Ok(fallback(resolved, field.target())?.into_variable())
    }

    /// Resolve a name known to denote an expression variable.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::EmptyField`] for an empty name.
    pub fn resolve_name(&self, name: &str) -> ResolveResult<FieldReference> {
        let resolved = match &self.parent {
            Parent::Root(context) => context.resolve_name(name),
            Parent::Scope(parent) => parent.resolve_name(name),
        };
        Ok(fallback(resolved, name)?.into_variable())
    }

    /// Map a whole document through the root context; bindings do not apply.
    #[must_use]
    pub fn map_document(&self, document: &Document) -> Document {
        self.context().map_document(document)
    }

    /// Compile `criteria` and map the result, as a `$match` stage embeds it.
    ///
    /// # Errors
    ///
    /// Propagates compile errors of `criteria`.
    pub fn map_criteria(&self, criteria: &Criteria) -> CriteriaResult<Document> {
        Ok(self.map_document(&criteria.compile()?))
    }

    fn context(&self) -> &RootContext {
        match &self.parent {
            Parent::Root(context) => context,
            Parent::Scope(parent) => parent.context(),
        }
    }

    fn binds(&self, field: &Field) -> bool {
        if self.bindings.is_empty() {
            return false;
        }
        self.bindings.contains(field.name())
            || (field.is_dotted() && self.bindings.contains(field.root_segment()))
    }
}

fn fallback(resolved: ResolveResult<FieldReference>, path: &str) -> ResolveResult<FieldReference> {
    match resolved {
        Err(ResolveError::InvalidReference { .. }) => Ok(FieldReference::path(path)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_reclassify_member_of_bound_variable() {
        let outer = Scope::root(RootContext::new());
        let inner = outer.nested(["items"]);

        let qty = inner.resolve(&Field::new("items.qty")).unwrap();
        assert!(qty.is_variable());
        assert_eq!(qty.to_string(), "$$items.qty");

        let price = inner.resolve(&Field::new("price")).unwrap();
        assert_eq!(price, outer.resolve(&Field::new("price")).unwrap());
        assert_eq!(price.to_string(), "$price");
    }

    #[test]
    fn test_should_reclassify_exact_binding() {
        let outer = Scope::root(RootContext::new());
        let inner = outer.nested(["item"]);
        assert_eq!(
            inner.resolve(&Field::new("item")).unwrap().to_string(),
            "$$item"
        );
    }

    #[test]
    fn test_should_match_whole_root_segment_only() {
        let outer = Scope::root(RootContext::new());
        let inner = outer.nested(["items"]);
        let reference = inner.resolve(&Field::new("itemsCount.total")).unwrap();
        assert_eq!(reference.to_string(), "$itemsCount.total");
    }

    #[test]
    fn test_should_keep_outer_binding_through_inner_scope() {
        let root = Scope::root(RootContext::new());
        let middle = root.nested(["order"]);
        let inner = middle.nested(["line"]);

        assert_eq!(
            inner.resolve(&Field::new("order.id")).unwrap().to_string(),
            "$$order.id"
        );
        assert_eq!(
            inner.resolve(&Field::new("line.sku")).unwrap().to_string(),
            "$$line.sku"
        );
        assert_eq!(
            middle.resolve(&Field::new("line.sku")).unwrap().to_string(),
            "$line.sku"
        );
    }

    #[test]
    fn test_should_short_circuit_empty_bindings() {
        let outer = Scope::root(RootContext::new());
        let inner = outer.nested(Vec::<String>::new());
        assert!(!inner.resolve(&Field::new("a.b")).unwrap().is_variable());
    }

    #[test]
    fn test_should_always_resolve_name_as_variable() {
        let outer = Scope::root(RootContext::exposing(["price"]));
        let inner = outer.nested(["items"]);
        assert_eq!(inner.resolve_name("price").unwrap().to_string(), "$$price");
        assert_eq!(inner.resolve_name("this").unwrap().to_string(), "$$this");
        assert_eq!(inner.resolve_name(""), Err(ResolveError::EmptyField));
    }

    #[test]
    fn test_should_resolve_locally_bound_field_unknown_to_root() {
        let outer = Scope::root(RootContext::exposing(["price"]));
        let inner = outer.nested(["items"]);

        assert_eq!(
            inner.resolve(&Field::new("items.qty")).unwrap().to_string(),
            "$$items.qty"
        );
        assert!(matches!(
            inner.resolve(&Field::new("qty")),
            Err(ResolveError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_should_map_documents_through_root_untouched_by_bindings() {
        let outer = Scope::root(RootContext::new().with_mapping("items", "line_items"));
        let inner = outer.nested(["items"]);
        let document = Document::single("items", Document::single("$size", 2));
        assert_eq!(inner.map_document(&document), outer.map_document(&document));
        assert_eq!(
            inner.map_document(&document).to_string(),
            r#"{"line_items":{"$size":2}}"#
        );
    }

    #[test]
    fn test_should_map_compiled_criteria() {
        let scope = Scope::root(RootContext::new().with_mapping("price", "unit_price"));
        let mut criteria = Criteria::field("price");
        criteria.gt(10).not().lt(5);
        assert_eq!(
            scope.map_criteria(&criteria).unwrap().to_string(),
            r#"{"unit_price":{"$gt":10,"$not":{"$lt":5}}}"#
        );
    }
}
