use expect_test::expect;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use query_core::{ArgumentValue, FieldNode, Variables};
use query_structure::{Prefetch, QueryValue};
use serde_json::json;
use test_setup::{plan, resolve_info};

fn input(value: serde_json::Value) -> QueryValue {
    QueryValue::from(value)
}

#[test]
fn filter_and_order_arguments_of_the_root_field() {
    let field_node = FieldNode::with_name("tasks")
        .argument("filter", input(json!({ "nameContains": "core", "assigneeName": "ada" })))
        .argument("orderBy", input(json!(["priorityAsc", "assigneeCountDesc"])))
        .fields(["name"]);

    expect![[r#"
        Task
          only: name
          alias: assignee_count = Count(assignees)
          filter: (name icontains "core" AND assignees__name = "ada")
          order_by: F(priority) ASC NULLS LAST, F(assignee_count) DESC
          distinct
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn filter_input_may_use_variables() {
    let filter = ArgumentValue::Object(IndexMap::from([(
        "nameContains".to_owned(),
        ArgumentValue::variable("term"),
    )]));

    let field_node = FieldNode::with_name("tasks").argument("filter", filter).fields(["name"]);
    let variables: Variables = IndexMap::from([("term".to_owned(), QueryValue::from("core"))]);

    let queryset = plan(&resolve_info(field_node).with_variables(variables)).unwrap();

    assert_eq!(queryset.filters().len(), 1);
    assert_eq!(queryset.filters()[0].to_string(), r#"name icontains "core""#);
    assert!(!queryset.is_distinct());
}

#[test]
fn missing_filter_variable_applies_no_filter() {
    let field_node = FieldNode::with_name("tasks")
        .argument("filter", ArgumentValue::variable("filter"))
        .fields(["name"]);

    let queryset = plan(&resolve_info(field_node)).unwrap();

    assert!(queryset.filters().is_empty());
}

#[test]
fn aliased_prefetches_are_filtered_separately() {
    let field_node = FieldNode::with_name("projects")
        .fields(["name"])
        .select(
            FieldNode::with_name("tasks")
                .alias("open")
                .argument("filter", input(json!({ "done": false })))
                .fields(["name"]),
        )
        .select(
            FieldNode::with_name("tasks")
                .alias("recent")
                .argument("orderBy", input(json!("nameDesc")))
                .fields(["name"]),
        );

    expect![[r#"
        Project
          only: name
          prefetch: tasks as open -> Task
            only: name, project_id
            filter: done = false
          prefetch: tasks as recent -> Task
            only: name, project_id
            order_by: F(name) DESC
          filter: archived = false
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn aliased_join_keeps_the_filters_below_it() {
    let field_node = FieldNode::with_name("tasks").select(
        FieldNode::with_name("project").alias("p").select(
            FieldNode::with_name("tasks")
                .argument("filter", input(json!({ "done": true })))
                .fields(["name"]),
        ),
    );

    expect![[r#"
        Task
          only: project_id
          select_related: project
          prefetch: project__tasks -> Task
            only: name, project_id
            filter: done = true
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn join_selected_under_two_keys_keeps_the_filters_of_both() {
    let field_node = FieldNode::with_name("tasks")
        .select(
            FieldNode::with_name("project")
                .alias("open")
                .select(FieldNode::with_name("tasks").argument("filter", input(json!({ "done": false })))),
        )
        .select(
            FieldNode::with_name("project")
                .select(FieldNode::with_name("owner").select(
                    FieldNode::with_name("assignedTasks").argument("filter", input(json!({ "done": true }))),
                )),
        );

    let queryset = plan(&resolve_info(field_node)).unwrap();

    let mut filters: Vec<_> = queryset
        .prefetches()
        .iter()
        .map(|prefetch| match prefetch {
            Prefetch::Queryset { lookup, queryset, .. } => (lookup.as_str(), queryset.filters()[0].to_string()),
            other => panic!("unexpected prefetch {other:?}"),
        })
        .collect();

    filters.sort();

    assert_eq!(
        filters,
        vec![
            ("project__owner__assigned_tasks", "done = true".to_owned()),
            ("project__tasks", "done = false".to_owned()),
        ]
    );
}

#[test]
fn filter_aliases_are_added_to_the_query_set() {
    let field_node = FieldNode::with_name("tasks")
        .argument("filter", input(json!({ "minAssignees": 2 })))
        .fields(["name"]);

    expect![[r#"
        Task
          only: name
          alias: assignee_count = Count(assignees)
          filter: assignee_count >= 2
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn nested_blocks_are_combined() {
    let field_node = FieldNode::with_name("tasks")
        .argument(
            "filter",
            input(json!({
                "OR": { "done": true, "projectName": "core" },
                "NOT": { "nameContains": "draft" },
            })),
        )
        .fields(["name"]);

    let queryset = plan(&resolve_info(field_node)).unwrap();

    assert_eq!(
        queryset.filters()[0].to_string(),
        r#"((done = true OR project__name icontains "core") AND NOT name icontains "draft")"#
    );
}

#[test]
fn unknown_filter_is_an_error() {
    let field_node = FieldNode::with_name("tasks")
        .argument("filter", input(json!({ "title": "core" })))
        .fields(["name"]);

    let error = plan(&resolve_info(field_node)).unwrap_err();

    assert_eq!(error.code(), "INVALID_FILTER");
    assert_eq!(
        error.to_string(),
        r#"Invalid input for "TaskFilterSet": unknown filter "title""#
    );
}

#[test]
fn unknown_ordering_is_an_error() {
    let field_node = FieldNode::with_name("tasks")
        .argument("orderBy", input(json!(["dueDateAsc"])))
        .fields(["name"]);

    let error = plan(&resolve_info(field_node)).unwrap_err();

    assert_eq!(error.code(), "INVALID_FILTER");
}

#[test]
fn unknown_argument_is_an_error() {
    let field_node = FieldNode::with_name("tasks").argument("first", 10i64).fields(["name"]);

    let error = plan(&resolve_info(field_node)).unwrap_err();

    assert_eq!(error.code(), "INVALID_ARGUMENT");
}
