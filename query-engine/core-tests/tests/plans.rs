use expect_test::expect;
use pretty_assertions::assert_eq;
use query_core::FieldNode;
use query_structure::Prefetch;
use test_setup::{plan, resolve_info};

fn field(name: &str) -> FieldNode {
    FieldNode::with_name(name)
}

#[test]
fn scalar_selection_only_loads_selected_fields() {
    let info = resolve_info(field("tasks").fields(["name", "done"]));
    let queryset = plan(&info).unwrap();

    assert_eq!(queryset.only_fields(), Some(&["name".to_owned(), "done".to_owned()][..]));
    assert!(queryset.select_related_lookups().is_empty());
    assert!(queryset.prefetches().is_empty());
}

#[test]
fn to_one_relation_is_joined() {
    let info = resolve_info(
        field("tasks")
            .fields(["name"])
            .select(field("project").fields(["name"])),
    );

    let queryset = plan(&info).unwrap();

    assert_eq!(
        queryset.only_fields().unwrap(),
        vec!["name", "project_id", "project__name"]
    );
    assert_eq!(queryset.select_related_lookups(), vec!["project"]);

    expect![[r#"
        Task
          only: name, project_id, project__name
          select_related: project
    "#]]
    .assert_eq(&queryset.to_string());
}

#[test]
fn nested_joins_are_flattened_into_the_root() {
    let info = resolve_info(
        field("tasks").select(
            field("project")
                .fields(["name"])
                .select(field("owner").fields(["name", "email"])),
        ),
    );

    expect![[r#"
        Task
          only: project_id, project__name, project__owner_id, project__owner__name, project__owner__email
          select_related: project, project__owner
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn reverse_one_to_one_is_joined() {
    let info = resolve_info(field("people").fields(["name"]).select(field("profile").fields(["bio"])));

    expect![[r#"
        Person
          only: name, profile__bio
          select_related: profile
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn foreign_key_without_selection_loads_the_id() {
    let info = resolve_info(field("tasks").fields(["project", "projectId"]));
    let queryset = plan(&info).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["project_id"]);
    assert!(queryset.select_related_lookups().is_empty());
}

#[test]
fn many_to_many_relation_is_prefetched() {
    let info = resolve_info(
        field("tasks")
            .fields(["name"])
            .select(field("assignees").fields(["name"])),
    );

    let queryset = plan(&info).unwrap();

    assert!(queryset.select_related_lookups().is_empty());

    match queryset.find_prefetch("assignees") {
        Some(Prefetch::Queryset { lookup, to_attr, queryset }) => {
            assert_eq!(lookup, "assignees");
            assert_eq!(to_attr, &None);
            assert_eq!(queryset.model().name(), "Person");
            assert_eq!(queryset.only_fields().unwrap(), vec!["name", "id"]);
        }
        other => panic!("expected a query set prefetch, got {other:?}"),
    }
}

#[test]
fn reverse_foreign_key_prefetch_loads_the_link_column() {
    let info = resolve_info(field("projects").fields(["name"]).select(field("tasks").fields(["name"])));

    expect![[r#"
        Project
          only: name
          prefetch: tasks -> Task
            only: name, project_id
          filter: archived = false
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn prefetch_below_a_join_is_moved_below_the_relation() {
    let info = resolve_info(field("tasks").select(field("project").select(field("tasks").fields(["name"]))));

    expect![[r#"
        Task
          only: project_id
          select_related: project
          prefetch: project__tasks -> Task
            only: name, project_id
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn annotated_join_is_promoted_to_prefetch() {
    let info = resolve_info(
        field("tasks")
            .fields(["name"])
            .select(field("project").fields(["name", "taskCount"])),
    );

    let queryset = plan(&info).unwrap();

    assert!(queryset.select_related_lookups().is_empty());

    expect![[r#"
        Task
          only: name, project_id
          prefetch: project -> Project
            only: name
            annotate: taskCount = Count(tasks)
            filter: archived = false
    "#]]
    .assert_eq(&queryset.to_string());
}

#[test]
fn annotation_on_the_root_stays_on_the_root() {
    let info = resolve_info(field("tasks").fields(["name", "assigneeCount"]));

    expect![[r#"
        Task
          only: name
          annotate: assigneeCount = Count(assignees, distinct)
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn aliased_relations_get_their_own_prefetch() {
    let info = resolve_info(
        field("projects")
            .select(field("tasks").alias("first").fields(["name"]))
            .select(field("tasks").alias("second").fields(["done"])),
    );

    let queryset = plan(&info).unwrap();

    assert_eq!(queryset.prefetches().len(), 2);

    expect![[r#"
        Project
          prefetch: tasks as first -> Task
            only: name, project_id
          prefetch: tasks as second -> Task
            only: done, project_id
          filter: archived = false
    "#]]
    .assert_eq(&queryset.to_string());
}

#[test]
fn repeated_relation_selections_are_merged() {
    let info = resolve_info(
        field("tasks")
            .select(field("assignees").fields(["name"]))
            .select(field("assignees").fields(["email"])),
    );

    expect![[r#"
        Task
          prefetch: assignees -> Person
            only: name, email, id
    "#]]
    .assert_eq(&plan(&info).unwrap().to_string());
}

#[test]
fn planning_is_idempotent() {
    let info = resolve_info(
        field("tasks")
            .fields(["name"])
            .select(field("project").fields(["name", "taskCount"]))
            .select(field("assignees").fields(["name"]).select(field("ownedProjects").fields(["name"]))),
    );

    assert_eq!(plan(&info).unwrap(), plan(&info).unwrap());
}

#[test]
fn field_nodes_of_the_same_response_key_are_combined() {
    let mut info = resolve_info(field("tasks").fields(["name"]));
    info.push_field_node(field("tasks").fields(["done"]));

    let queryset = plan(&info).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["name", "done"]);
}

#[test]
fn typename_is_ignored() {
    let info = resolve_info(field("tasks").fields(["__typename", "name"]));

    assert_eq!(plan(&info).unwrap().only_fields().unwrap(), vec!["name"]);
}
