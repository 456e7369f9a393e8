//! Criteria building and compilation scenarios.

#[cfg(test)]
mod tests {
    use docquery_core::{Criteria, CriteriaError, QueryConfig};
    use docquery_model::{Circle, GeoJson, JsonType, Point};
    use serde_json::json;

    use crate::{init_tracing, to_json};

    #[test]
    fn test_should_build_order_search_query() {
        init_tracing();

        let mut paid = Criteria::field("status");
        paid.is("paid").unwrap();
        let mut shipped = Criteria::field("status");
        shipped.is("shipped").unwrap();

        let mut criteria = Criteria::field("total");
        criteria.gte(100).lt(1000);
        criteria
            .and("tags")
            .unwrap()
            .all(["priority", "gift"])
            .unwrap();
        criteria
            .and("customer.email")
            .unwrap()
            .regex_with_options(r"@example\.com$", "i")
            .unwrap();
        criteria.or_operator(&[paid, shipped]).unwrap();

        let document = criteria.compile().unwrap();
        tracing::debug!(query = %document, "built order search query");
        assert_eq!(
            to_json(&document),
            json!({
                "total": {"$gte": 100, "$lt": 1000},
                "tags": {"$all": ["priority", "gift"]},
                "customer.email": {"$regex": r"@example\.com$", "$options": "i"},
                "$or": [{"status": "paid"}, {"status": "shipped"}]
            })
        );
    }

    #[test]
    fn test_should_negate_pattern_and_range() {
        init_tracing();

        let mut criteria = Criteria::field("name");
        criteria.not().regex("^tmp_").unwrap();
        criteria.and("age").unwrap().not().gt(65);

        assert_eq!(
            to_json(&criteria.compile().unwrap()),
            json!({
                "name": {"$not": {"$regex": "^tmp_"}},
                "age": {"$not": {"$gt": 65}}
            })
        );
    }

    #[test]
    fn test_should_build_geo_queries() {
        init_tracing();

        let mut nearby = Criteria::field("location");
        nearby
            .near(GeoJson::Point(Point::new(-73.97, 40.77)))
            .max_distance(1000.0)
            .min_distance(10.0);
        assert_eq!(
            to_json(&nearby.compile().unwrap()),
            json!({
                "location": {
                    "$near": {
                        "$geometry": {"type": "Point", "coordinates": [-73.97, 40.77]},
                        "$maxDistance": 1000.0,
                        "$minDistance": 10.0
                    }
                }
            })
        );

        let mut within = Criteria::field("location");
        within.within(Circle::new(Point::new(0.0, 0.0), 2.0));
        assert_eq!(
            to_json(&within.compile().unwrap()),
            json!({"location": {"$geoWithin": {"$center": [[0.0, 0.0], 2.0]}}})
        );
    }

    #[test]
    fn test_should_match_array_elements_and_types() {
        init_tracing();

        let mut line = Criteria::field("sku");
        line.is_in(["A-1", "B-2"]).unwrap();
        line.and("qty").unwrap().gt(0);

        let mut criteria = Criteria::field("lines");
        criteria.elem_match(&line).unwrap().size(3);
        criteria
            .and("note")
            .unwrap()
            .exists(true)
            .type_of(&[JsonType::String, JsonType::Null]);

        assert_eq!(
            to_json(&criteria.compile().unwrap()),
            json!({
                "lines": {
                    "$elemMatch": {"sku": {"$in": ["A-1", "B-2"]}, "qty": {"$gt": 0}},
                    "$size": 3
                },
                "note": {"$exists": true, "$type": ["string", "null"]}
            })
        );
    }

    #[test]
    fn test_should_store_bitmasks() {
        init_tracing();

        let mut criteria = Criteria::field("permissions");
        criteria.bits().any_set(vec![1u32, 3]).unwrap();
        criteria.and("flags").unwrap().bits().all_clear("Dw==").unwrap();

        assert_eq!(
            to_json(&criteria.compile().unwrap()),
            json!({
                "permissions": {"$bitsAnySet": [1, 3]},
                "flags": {"$bitsAllClear": {"$binary": {"base64": "Dw==", "subType": "00"}}}
            })
        );
    }

    #[test]
    fn test_should_leave_builder_intact_after_rejected_calls() {
        init_tracing();

        let mut criteria = Criteria::field("name");
        criteria.is("alice").unwrap();
        let before = criteria.clone();

        assert!(matches!(
            criteria.is("bob"),
            Err(CriteriaError::ConflictingAssignment { .. })
        ));
        assert!(matches!(
            criteria.is_in([json_array(), json_array()]),
            Err(CriteriaError::AmbiguousArgument { .. })
        ));
        assert!(matches!(
            criteria.bits().all_set(" "),
            Err(CriteriaError::InvalidBitmask { .. })
        ));
        assert_eq!(criteria, before);
    }

    #[test]
    fn test_should_report_duplicate_key_on_compile() {
        init_tracing();

        let mut criteria = Criteria::field("name");
        criteria.is("a").unwrap();
        criteria.and("name").unwrap().not_equal("b");

        let err = criteria.compile().unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"cannot add a second 'name' expression specified as 'name : {"$ne":"b"}'; criteria already contains 'name : "a"'"#
        );
    }

    #[test]
    fn test_should_compile_patterns_under_configured_limits() {
        init_tracing();

        let config = QueryConfig {
            regex_size_limit: 4096,
            ..QueryConfig::default()
        };
        assert!(matches!(
            config.compile_pattern(r"\w{500}", ""),
            Err(CriteriaError::Pattern(_))
        ));

        let pattern = config.compile_pattern("^ab", "i").unwrap();
        let mut criteria = Criteria::field("code");
        criteria.regex_pattern(pattern);
        assert_eq!(
            to_json(&criteria.compile().unwrap()),
            json!({"code": {"$regex": "^ab", "$options": "i"}})
        );
    }

    #[test]
    fn test_should_keep_lookaround_patterns_for_the_server() {
        init_tracing();

        let mut criteria = Criteria::field("login");
        criteria.regex_with_options("^(?!admin)", "i").unwrap();
        criteria.and("status").unwrap().not_equal("disabled");

        assert_eq!(
            to_json(&criteria.compile().unwrap()),
            json!({
                "login": {"$regex": "^(?!admin)", "$options": "i"},
                "status": {"$ne": "disabled"}
            })
        );
    }

    fn json_array() -> docquery_model::Value {
        docquery_model::Value::from(vec![1, 2])
    }
}
