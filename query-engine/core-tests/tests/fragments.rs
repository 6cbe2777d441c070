use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use query_core::{ArgumentValue, CoreError, Directive, FieldNode, FragmentDefinition, Fragments, Selection, Variables};
use query_structure::QueryValue;
use test_setup::{plan, resolve_info};

fn fragments(definitions: impl IntoIterator<Item = FragmentDefinition>) -> Fragments {
    definitions
        .into_iter()
        .map(|definition| (definition.name.clone(), definition))
        .collect()
}

fn skip(condition: impl Into<ArgumentValue>) -> Directive {
    Directive::new("skip").argument("if", condition)
}

fn include(condition: impl Into<ArgumentValue>) -> Directive {
    Directive::new("include").argument("if", condition)
}

#[test]
fn fragments_on_abstract_types_apply_to_their_members() {
    let field_node = FieldNode::with_name("tasks")
        .select(Selection::spread("NodeFields"))
        .select(Selection::inline(Some("CommentTarget"), [FieldNode::with_name("done")]));

    let info = resolve_info(field_node).with_fragments(fragments([FragmentDefinition {
        name: "NodeFields".to_owned(),
        type_condition: "Node".to_owned(),
        selection_set: vec![FieldNode::with_name("name").into()],
    }]));

    assert_eq!(plan(&info).unwrap().only_fields().unwrap(), vec!["name", "done"]);
}

#[test]
fn fragments_on_other_models_are_pruned() {
    let field_node = FieldNode::with_name("tasks")
        .select(Selection::inline(Some("TaskType"), [FieldNode::with_name("priority")]))
        .select(Selection::inline(
            Some("ProjectType"),
            [FieldNode::with_name("owner").fields(["name"])],
        ))
        .select(Selection::inline(None, [FieldNode::with_name("name")]));

    let queryset = plan(&resolve_info(field_node)).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["priority", "name"]);
    assert!(queryset.select_related_lookups().is_empty());
}

#[test]
fn unknown_fragment_is_an_error() {
    let info = resolve_info(FieldNode::with_name("tasks").select(Selection::spread("Missing")));

    assert_eq!(
        plan(&info).unwrap_err(),
        CoreError::UnknownFragment("Missing".to_owned())
    );
}

#[test]
fn skip_and_include_directives_are_honoured() {
    let field_node = FieldNode::with_name("tasks")
        .select(FieldNode::with_name("name").directive(skip(true)))
        .select(FieldNode::with_name("done").directive(skip(false)))
        .select(FieldNode::with_name("priority").directive(include(ArgumentValue::variable("withPriority"))))
        .select(
            FieldNode::with_name("project")
                .fields(["name"])
                .directive(include(ArgumentValue::variable("withProject"))),
        );

    let variables: Variables = IndexMap::from([
        ("withPriority".to_owned(), QueryValue::Boolean(true)),
        ("withProject".to_owned(), QueryValue::Boolean(false)),
    ]);

    let queryset = plan(&resolve_info(field_node).with_variables(variables)).unwrap();

    assert_eq!(queryset.only_fields().unwrap(), vec!["done", "priority"]);
    assert!(queryset.select_related_lookups().is_empty());
}

#[test]
fn directive_condition_must_be_a_boolean() {
    let field_node = FieldNode::with_name("tasks").select(FieldNode::with_name("name").directive(skip("yes")));

    let error = plan(&resolve_info(field_node)).unwrap_err();

    assert_eq!(error.code(), "INVALID_ARGUMENT");
}
