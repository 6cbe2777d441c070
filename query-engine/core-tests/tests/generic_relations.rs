use expect_test::expect;
use pretty_assertions::assert_eq;
use query_core::{FieldNode, Selection};
use query_structure::{Prefetch, QueryValue};
use serde_json::json;
use test_setup::{plan, resolve_info};

#[test]
fn generic_foreign_key_prefetches_every_possible_model() {
    let field_node = FieldNode::with_name("comments").fields(["body"]).select(
        FieldNode::with_name("target")
            .select(Selection::inline(Some("TaskType"), [FieldNode::with_name("name")]))
            .select(Selection::inline(
                Some("ProjectType"),
                [FieldNode::with_name("name"), FieldNode::with_name("id")],
            )),
    );

    let queryset = plan(&resolve_info(field_node)).unwrap();

    assert!(queryset.select_related_lookups().is_empty());

    expect![[r#"
        Comment
          only: body, content_type_id, object_id
          prefetch: target -> generic
            Project
              only: name, id
              filter: archived = false
            Task
              only: name
    "#]]
    .assert_eq(&queryset.to_string());
}

#[test]
fn generic_foreign_key_without_model_types_falls_back_to_a_named_prefetch() {
    let field_node = FieldNode::with_name("comments").select(
        FieldNode::with_name("attachment").select(Selection::inline(
            Some("ExternalLinkType"),
            [FieldNode::with_name("url")],
        )),
    );

    let queryset = plan(&resolve_info(field_node)).unwrap();

    assert_eq!(queryset.prefetches(), &[Prefetch::lookup("target")]);
    assert_eq!(queryset.only_fields().unwrap(), vec!["content_type_id", "object_id"]);
}

#[test]
fn generic_relation_is_prefetched_with_its_link_columns() {
    let field_node = FieldNode::with_name("tasks")
        .fields(["name"])
        .select(FieldNode::with_name("comments").fields(["body"]));

    expect![[r#"
        Task
          only: name
          prefetch: comments -> Comment
            only: body, content_type_id, object_id
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn generic_foreign_key_below_a_prefetch() {
    let field_node = FieldNode::with_name("projects").select(
        FieldNode::with_name("comments")
            .select(FieldNode::with_name("author").fields(["name"]))
            .select(FieldNode::with_name("target").select(Selection::inline(
                Some("Node"),
                [FieldNode::with_name("name")],
            ))),
    );

    expect![[r#"
        Project
          prefetch: comments -> Comment
            only: author_id, content_type_id, object_id, author__name
            select_related: author
            prefetch: target -> generic
              Project
                only: name
                filter: archived = false
              Task
                only: name
          filter: archived = false
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}

#[test]
fn generic_foreign_key_members_keep_their_own_filters() {
    let comments = |term: &str| {
        FieldNode::with_name("comments")
            .argument("filter", QueryValue::from(json!({ "bodyContains": term })))
            .fields(["body"])
    };

    let field_node = FieldNode::with_name("comments").select(
        FieldNode::with_name("target")
            .select(Selection::inline(Some("ProjectType"), [comments("a")]))
            .select(Selection::inline(Some("TaskType"), [comments("b")])),
    );

    expect![[r#"
        Comment
          only: content_type_id, object_id
          prefetch: target -> generic
            Project
              prefetch: comments -> Comment
                only: body, content_type_id, object_id
                filter: body icontains "a"
              filter: archived = false
            Task
              prefetch: comments -> Comment
                only: body, content_type_id, object_id
                filter: body icontains "b"
    "#]]
    .assert_eq(&plan(&resolve_info(field_node)).unwrap().to_string());
}
