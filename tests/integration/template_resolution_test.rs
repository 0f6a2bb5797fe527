//! Placeholder resolution integration tests

use proptest::prelude::*;
use rest_chain::models::HttpResponse;
use rest_chain::store::ResponseStore;
use rest_chain::variables::{ResolveError, ResolveOptions, TemplateResolver, VariableMap};

fn resolve(resolver: &TemplateResolver, text: &str, variables: &VariableMap) -> String {
    resolver
        .resolve(text, variables, ResolveOptions::default())
        .unwrap()
}

fn vars(pairs: &[(&str, &str)]) -> VariableMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

proptest! {
    #[test]
    fn text_without_braces_is_unchanged(text in "[^{}]*") {
        let resolver = TemplateResolver::default();
        prop_assert_eq!(resolve(&resolver, &text, &VariableMap::new()), text);
    }

    #[test]
    fn known_variable_is_substituted(
        key in "[A-Za-z_][A-Za-z0-9_]{0,12}",
        value in "[^{}]{0,24}",
        prefix in "[^{}]{0,12}",
    ) {
        let resolver = TemplateResolver::default();
        let variables = vars(&[(&key, &value)]);
        let text = format!("{}{{{{{}}}}}", prefix, key);
        prop_assert_eq!(resolve(&resolver, &text, &variables), format!("{}{}", prefix, value));
    }

    #[test]
    fn resolving_twice_changes_nothing(
        key in "[a-z]{1,8}",
        value in "[^{}]{0,16}",
        other in "[A-Z]{1,8}",
    ) {
        let resolver = TemplateResolver::default();
        let variables = vars(&[(&key, &value)]);
        let text = format!("{{{{{}}}}}/{{{{{}}}}}", key, other);

        let once = resolve(&resolver, &text, &variables);
        let twice = resolve(&resolver, &once, &variables);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn random_int_stays_in_range(a in -1000i64..1000, b in -1000i64..1000) {
        let resolver = TemplateResolver::default();
        let text = format!("{{{{$randomInt {} {}}}}}", a, b);
        let value: i64 = resolve(&resolver, &text, &VariableMap::new()).parse().unwrap();
        prop_assert!(value >= a.min(b) && value <= a.max(b));
    }
}

#[test]
fn test_random_int_fixed_and_reversed_bounds() {
    let resolver = TemplateResolver::default();
    let empty = VariableMap::new();

    assert_eq!(resolve(&resolver, "{{$randomInt 5 5}}", &empty), "5");
    for _ in 0..50 {
        let value: i64 = resolve(&resolver, "{{$randomInt 100 1}}", &empty)
            .parse()
            .unwrap();
        assert!((1..=100).contains(&value));
    }
}

#[test]
fn test_unknown_chain_reference_is_kept() {
    let resolver = TemplateResolver::new(ResponseStore::new());
    let text = "Bearer {{login.response.body.token}}";

    assert_eq!(resolve(&resolver, text, &VariableMap::new()), text);
}

#[test]
fn test_chain_reference_reads_stored_response() {
    let store = ResponseStore::new();
    let mut response = HttpResponse::new(201, "Created");
    response.add_header("Location", "/users/7");
    response.set_body(r#"{"items":[{"id":"a"},{"id":"b"}]}"#);
    store.store("create", response);

    let resolver = TemplateResolver::new(store);
    let empty = VariableMap::new();

    assert_eq!(
        resolve(&resolver, "{{create.response.body.items[1].id}}", &empty),
        "b"
    );
    assert_eq!(
        resolve(&resolver, "{{create.response.headers.location}}", &empty),
        "/users/7"
    );
    assert_eq!(resolve(&resolver, "{{create.response.status}}", &empty), "201");
}

#[test]
fn test_variables_win_over_chain_references() {
    let store = ResponseStore::new();
    let mut response = HttpResponse::new(200, "OK");
    response.set_body(r#"{"token":"stored"}"#);
    store.store("login", response);

    let resolver = TemplateResolver::new(store);
    let variables = vars(&[("login.response.body.token", "explicit")]);

    assert_eq!(
        resolve(&resolver, "{{login.response.body.token}}", &variables),
        "explicit"
    );
}

#[test]
fn test_mutual_reference_terminates() {
    let resolver = TemplateResolver::default();
    let variables = vars(&[("A", "{{B}}"), ("B", "{{A}}")]);

    let result = resolve(&resolver, "{{A}}", &variables);
    assert!(result == "{{A}}" || result == "{{B}}");

    let err = resolver
        .resolve("{{A}}", &variables, ResolveOptions::default().strict())
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnresolvedVariables(names) if names.len() == 1));
}

#[test]
fn test_nested_expansion_within_depth() {
    let resolver = TemplateResolver::default();
    let variables = vars(&[
        ("url", "{{host}}/{{path}}"),
        ("host", "https://{{domain}}"),
        ("domain", "example.com"),
        ("path", "v1"),
    ]);

    assert_eq!(
        resolve(&resolver, "{{url}}", &variables),
        "https://example.com/v1"
    );

    let shallow = ResolveOptions {
        max_depth: 1,
        fail_on_unresolved: false,
    };
    assert_eq!(
        resolver.resolve("{{url}}", &variables, shallow).unwrap(),
        "{{host}}/{{path}}"
    );
}

#[test]
fn test_strict_lists_each_missing_name_once() {
    let resolver = TemplateResolver::default();
    let err = resolver
        .resolve(
            "{{a}} {{b}} {{ a }} {{$nope}}",
            &VariableMap::new(),
            ResolveOptions::default().strict(),
        )
        .unwrap_err();

    assert_eq!(
        err,
        ResolveError::UnresolvedVariables(vec![
            "a".to_string(),
            "b".to_string(),
            "$nope".to_string()
        ])
    );
}
