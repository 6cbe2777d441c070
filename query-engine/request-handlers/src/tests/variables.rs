use super::helpers::*;
use crate::GraphqlBody;
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::json;

const FILTER_BY_TERM: &str = indoc! {r#"
    query Tasks($term: String!) {
      tasks(filter: { nameContains: $term }) { name }
    }
"#};

#[test]
fn variables_are_substituted_into_arguments() {
    let response = handle_body(GraphqlBody::new(FILTER_BY_TERM).variables(json!({ "term": "core" })));

    assert!(!response.has_errors());
    assert_eq!(
        response.data["tasks"]["filters"],
        json!([{ "condition": { "path": "name", "op": "icontains", "value": "core" } }])
    );
}

#[test]
fn missing_required_variable_fails_the_request() {
    let response = handle(FILTER_BY_TERM);
    let (code, message) = single_error(&response);

    assert_eq!(code, "MISSING_VARIABLE");
    assert_eq!(message, r#"Variable "$term" of a required type was not provided"#);
}

#[test]
fn null_is_not_accepted_for_a_required_variable() {
    let response = handle_body(GraphqlBody::new(FILTER_BY_TERM).variables(json!({ "term": null })));
    let (code, _) = single_error(&response);

    assert_eq!(code, "MISSING_VARIABLE");
}

#[test]
fn declared_default_is_used_when_not_provided() {
    let response = handle(indoc! {r#"
        query Tasks($order: [TaskOrder!] = [priorityDesc]) {
          tasks(orderBy: $order) { name }
        }
    "#});

    assert!(!response.has_errors());
    assert_eq!(
        response.data["tasks"]["orderBy"],
        json!([{
            "expression": { "field": "priority" },
            "sortOrder": "Descending",
            "nullsOrder": "Last",
        }])
    );
}

#[test]
fn directives_use_variables() {
    let query = indoc! {r#"
        query Tasks($withDone: Boolean!, $withProjects: Boolean = true) {
          tasks { name done @include(if: $withDone) }
          projects @include(if: $withProjects) { name }
        }
    "#};

    let response = handle_body(GraphqlBody::new(query).variables(json!({ "withDone": false, "withProjects": false })));

    assert!(!response.has_errors());
    assert_eq!(response.data.keys().collect::<Vec<_>>(), vec!["tasks"]);
    assert_eq!(response.data["tasks"]["only"], json!(["name"]));
}

#[test]
fn undeclared_variables_are_ignored() {
    let query = "{ tasks(filter: { nameContains: $term }) { name } }";
    let response = handle_body(GraphqlBody::new(query).variables(json!({ "term": "core" })));

    assert!(!response.has_errors());
    assert_eq!(response.data["tasks"].get("filters"), None);
}
