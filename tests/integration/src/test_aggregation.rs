//! Field resolution scenarios across nested expression scopes.

#[cfg(test)]
mod tests {
    use docquery_core::{Criteria, Field, FieldReference, ResolveError, RootContext, Scope};
    use docquery_model::Document;
    use serde_json::json;

    use crate::{init_tracing, to_json};

    #[test]
    fn test_should_resolve_map_expression_fields() {
        init_tracing();

        let stage = Scope::root(RootContext::exposing(["items", "price", "discount"]));
        let map = stage.nested(["item"]);

        let projected = Document::new()
            .with("sku", map.resolve(&Field::new("item.sku")).unwrap().to_value())
            .with("price", map.resolve(&Field::new("price")).unwrap().to_value())
            .with("input", map.resolve(&Field::new("items")).unwrap().to_value());

        assert_eq!(
            to_json(&projected),
            json!({"sku": "$$item.sku", "price": "$price", "input": "$items"})
        );
    }

    #[test]
    fn test_should_match_outer_resolution_for_unbound_fields() {
        init_tracing();

        let outer = Scope::root(RootContext::new().with_mapping("price", "unit_price"));
        let inner = outer.nested(["items"]);

        let field = Field::aliased("cost", "price.net");
        assert_eq!(inner.resolve(&field), outer.resolve(&field));
        assert_eq!(
            inner.resolve(&field).unwrap(),
            FieldReference::path("unit_price.net")
        );
    }

    #[test]
    fn test_should_resolve_let_variables_by_name() {
        init_tracing();

        let stage = Scope::root(RootContext::exposing(["total"]));
        let let_scope = stage.nested(["rate"]);

        assert_eq!(let_scope.resolve_name("rate").unwrap().to_string(), "$$rate");
        assert_eq!(let_scope.resolve_name("total").unwrap().to_string(), "$$total");
        assert!(matches!(
            let_scope.resolve(&Field::new("missing")),
            Err(ResolveError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_should_map_match_stage_through_nested_scope() {
        init_tracing();

        let stage = Scope::root(
            RootContext::new()
                .with_mapping("createdAt", "created_at")
                .with_mapping("owner", "owner_id"),
        );
        let inner = stage.nested(["owner"]);

        let mut criteria = Criteria::field("createdAt");
        criteria.gte(20);
        criteria.and("owner.name").unwrap().is("ann").unwrap();

        assert_eq!(
            to_json(&inner.map_criteria(&criteria).unwrap()),
            json!({"created_at": {"$gte": 20}, "owner_id.name": "ann"})
        );
    }
}
