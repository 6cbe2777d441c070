use expect_test::expect;
use pretty_assertions::assert_eq;
use query_core::{FieldNode, ObjectType, OutputField, QuerySchema, QuerySchemaRef, ResolveInfo};
use query_structure::Filter;
use tracing_test::traced_test;

fn field(name: &str) -> FieldNode {
    FieldNode::with_name(name)
}

/// A custom field whose hook filters the query set by the name of the filter info the manual
/// optimizer receives.
fn marker() -> OutputField {
    OutputField::custom("marker").optimizer_hook(|optimizer, field_node, _| {
        optimizer.add_manual_optimizer(field_node.response_key(), |queryset, filter_info| {
            queryset.filter(Filter::lookup("name", filter_info.field_name.as_str()))
        });

        Ok(())
    })
}

fn schema() -> QuerySchemaRef {
    QuerySchema::builder(test_setup::datamodel())
        .object(
            ObjectType::builder("ProjectType")
                .model("Project")
                .scalars(["name"])
                .field(OutputField::relation("tasks", "TaskType"))
                .field(marker())
                .filter_queryset(|queryset, _| Ok(queryset.filter(Filter::lookup("archived", false)))),
        )
        .object(
            ObjectType::builder("TaskType")
                .model("Task")
                .scalars(["name", "done"])
                .field(OutputField::relation("project", "ProjectType"))
                .field(marker())
                .pre_optimization(|queryset, optimizer| {
                    optimizer.add_only_field("id");
                    queryset
                }),
        )
        .query_field(OutputField::custom("tasks").of_type("TaskType"))
        .query_field(OutputField::custom("projects").of_type("ProjectType"))
        .build()
        .unwrap()
}

fn plan(field_node: FieldNode) -> String {
    let info = ResolveInfo::new(schema(), field_node);

    test_setup::plan(&info).unwrap().to_string()
}

#[test]
#[traced_test]
fn custom_field_without_hook_is_skipped_with_a_warning() {
    let info = test_setup::resolve_info(field("tasks").fields(["name", "summary"]));
    let queryset = test_setup::plan(&info).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["name"]);
    assert!(logs_contain("No optimizer hook registered for custom field"));
}

#[test]
fn custom_field_hook_adds_the_fields_it_needs() {
    let info = test_setup::resolve_info(field("tasks").fields(["name", "isOverdue"]));
    let queryset = test_setup::plan(&info).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["name", "due_date", "done"]);
}

#[test]
fn manual_optimizer_falls_back_to_the_filter_info_of_its_node() {
    expect![[r#"
        Task
          only: name, id
          filter: name = "tasks"
    "#]]
    .assert_eq(&plan(field("tasks").fields(["name", "marker"])));
}

#[test]
fn manual_optimizer_promotes_a_joined_relation() {
    expect![[r#"
        Task
          only: project_id, id
          prefetch: project -> Project
            only: name
            filter: name = "project"
            filter: archived = false
    "#]]
    .assert_eq(&plan(field("tasks").select(field("project").fields(["name", "marker"]))));
}

#[test]
fn pre_optimization_hook_runs_for_prefetched_relations() {
    expect![[r#"
        Project
          prefetch: tasks -> Task
            only: name, project_id, id
          filter: archived = false
    "#]]
    .assert_eq(&plan(field("projects").select(field("tasks").fields(["name"]))));
}

#[test]
fn filter_queryset_hook_restricts_the_root_query_set() {
    expect![[r#"
        Project
          only: name
          filter: archived = false
    "#]]
    .assert_eq(&plan(field("projects").fields(["name"])));
}

#[test]
fn get_queryset_hook_is_the_base_of_prefetches() {
    let info = test_setup::resolve_info(field("people").select(field("ownedProjects").fields(["name"])));
    let queryset = test_setup::plan(&info).unwrap();

    let prefetch = queryset.prefetches().first().unwrap();

    assert_eq!(prefetch.lookup_path(), "owned_projects");
    assert_eq!(prefetch.result_key(), "ownedProjects");

    expect![[r#"
        Person
          prefetch: owned_projects as ownedProjects -> Project
            only: name, owner_id
            filter: archived = false
    "#]]
    .assert_eq(&queryset.to_string());
}
