use super::*;
use crate::{CoreError, FieldNode, ResolveInfo};
use pretty_assertions::assert_eq;
use query_structure::{Datamodel, DatamodelRef, Expression, NullsOrder, QueryValue};
use serde_json::json;

fn datamodel() -> DatamodelRef {
    Datamodel::builder()
        .model("Project", |m| m.scalar("name").reverse_foreign_key("tasks", "Task", "project"))
        .model("Task", |m| {
            m.scalars(["name", "done"])
                .foreign_key("project", "Project")
                .many_to_many("assignees", "Person")
        })
        .model("Person", |m| m.scalar("name"))
        .build()
        .unwrap()
}

fn task_filters() -> DeclarativeFilterSet {
    DeclarativeFilterSet::new("TaskFilterSet")
        .filter("nameContains", FilterDefinition::new("name__icontains"))
        .filter("done", FilterDefinition::new("done"))
        .filter("assigneeName", FilterDefinition::new("assignees__name").distinct())
}

fn task_ordering() -> DeclarativeOrderSet {
    DeclarativeOrderSet::new("TaskOrderSet")
        .order("name", OrderDefinition::field("name").nulls(NullsOrder::Last))
        .order(
            "assigneeCount",
            OrderDefinition::aliased("assignee_count", Expression::count("assignees")),
        )
}

fn schema() -> QuerySchemaRef {
    QuerySchema::builder(datamodel())
        .object(
            ObjectType::builder("ProjectType")
                .model("Project")
                .scalars(["name"])
                .field(OutputField::relation("tasks", "TaskType")),
        )
        .object(
            ObjectType::builder("TaskType")
                .model("Task")
                .scalars(["name", "done"])
                .field(OutputField::relation("project", "ProjectType"))
                .filterset(task_filters())
                .orderset(task_ordering()),
        )
        .query_field(OutputField::custom("tasks").of_type("TaskType"))
        .build()
        .unwrap()
}

fn info() -> ResolveInfo {
    ResolveInfo::new(schema(), FieldNode::with_name("tasks"))
}

#[test]
fn list_fields_receive_filter_and_order_arguments() {
    let schema = schema();

    let project_tasks = schema.find_field("ProjectType", "tasks").unwrap();
    let root_tasks = schema.query_field("tasks").unwrap();
    let task_project = schema.find_field("TaskType", "project").unwrap();

    let names = |field: &OutputField| field.arguments().iter().map(|arg| arg.name.clone()).collect::<Vec<_>>();

    assert_eq!(names(project_tasks), vec!["filter", "orderBy"]);
    assert_eq!(names(root_tasks), vec!["filter", "orderBy"]);
    assert!(names(task_project).is_empty());
}

#[test]
fn relation_to_type_of_other_model_is_rejected() {
    let result = QuerySchema::builder(datamodel())
        .object(ObjectType::builder("PersonType").model("Person").scalars(["name"]))
        .object(
            ObjectType::builder("TaskType")
                .model("Task")
                .field(OutputField::relation("project", "PersonType")),
        )
        .build();

    assert_eq!(
        result.unwrap_err(),
        CoreError::SchemaError(
            "Field \"TaskType.project\" returns \"PersonType\" which is not bound to model \"Project\"".to_owned()
        )
    );
}

#[test]
fn model_fields_must_exist() {
    let result = QuerySchema::builder(datamodel())
        .object(ObjectType::builder("TaskType").model("Task").scalars(["title"]))
        .build();

    assert!(matches!(result, Err(CoreError::SchemaError(message)) if message.contains("unknown field \"title\"")));
}

#[test]
fn foreign_key_without_output_type_is_an_id_field() {
    let result = QuerySchema::builder(datamodel())
        .object(
            ObjectType::builder("TaskType")
                .model("Task")
                .field(OutputField::scalar("project"))
                .field(OutputField::scalar("project_id")),
        )
        .build();

    assert!(result.is_ok());
}

#[test]
fn union_members_must_be_object_types() {
    let result = QuerySchema::builder(datamodel())
        .interface(InterfaceType::new("Node"))
        .union(UnionType::new("Searchable", ["Node"]))
        .build();

    assert!(matches!(result, Err(CoreError::SchemaError(message)) if message.contains("is not an object type")));
}

#[test]
fn filter_blocks_are_combined() {
    let info = info();
    let data = QueryValue::from(json!({
        "nameContains": "core",
        "OR": { "done": true, "assigneeName": "ada" },
        "NOT": { "done": false },
    }));

    let results = task_filters().build(&data, &info).unwrap();

    assert_eq!(
        results.filter.to_string(),
        r#"(name icontains "core" AND (done = true OR assignees__name = "ada") AND NOT done = false)"#
    );
    assert!(results.distinct);
}

#[test]
fn null_filter_input_is_ignored() {
    let info = info();
    let data = QueryValue::from(json!({ "nameContains": null, "NOT": {} }));

    let results = task_filters().build(&data, &info).unwrap();

    assert!(results.filter.is_empty());
    assert!(!results.distinct);
}

#[test]
fn unknown_filter_is_an_error() {
    let info = info();
    let data = QueryValue::from(json!({ "title": "x" }));

    let error = task_filters().build(&data, &info).unwrap_err();

    assert_eq!(error.to_string(), "Invalid input for \"TaskFilterSet\": unknown filter \"title\"");
    assert_eq!(error.code(), "INVALID_FILTER");
}

#[test]
fn orderings_parse_direction_and_aliases() {
    let info = info();
    let data = QueryValue::list([
        QueryValue::Enum("assigneeCountDesc".into()),
        QueryValue::Enum("nameAsc".into()),
    ]);

    let results = task_ordering().build(&data, &info).unwrap();

    assert_eq!(
        results.order_by.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["F(assignee_count) DESC", "F(name) ASC NULLS LAST"]
    );
    assert_eq!(
        results.aliases.get("assignee_count"),
        Some(&Expression::count("assignees"))
    );
    assert_eq!(
        task_ordering().enum_values(),
        vec!["nameAsc", "nameDesc", "assigneeCountAsc", "assigneeCountDesc"]
    );
}

#[test]
fn single_ordering_is_coerced_to_a_list() {
    let info = info();

    let results = task_ordering().build(&QueryValue::Enum("nameDesc".into()), &info).unwrap();

    assert_eq!(results.order_by.len(), 1);
    assert!(task_ordering().build(&QueryValue::Enum("name".into()), &info).is_err());
}
