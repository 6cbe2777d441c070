use pretty_assertions::assert_eq;
use query_core::{CoreError, FieldNode, OptimizationCompiler, OptimizerSettings, ResolveInfo};
use test_setup::{plan, schema_with_settings};

fn info_with_max_complexity(max_complexity: usize, field_node: FieldNode) -> ResolveInfo {
    let settings = OptimizerSettings {
        max_complexity,
        ..Default::default()
    };

    ResolveInfo::new(schema_with_settings(settings), field_node)
}

fn three_relations() -> FieldNode {
    FieldNode::with_name("tasks")
        .select(FieldNode::with_name("project").select(FieldNode::with_name("owner").fields(["name"])))
        .select(FieldNode::with_name("assignees").fields(["name"]))
}

#[test]
fn exceeding_the_budget_fails_the_plan() {
    let info = info_with_max_complexity(2, three_relations());
    let error = plan(&info).unwrap_err();

    assert_eq!(error, CoreError::ComplexityExceeded { max: 2 });
    assert_eq!(error.to_string(), "Query complexity exceeds the maximum allowed of 2");
    assert_eq!(error.code(), "COMPLEXITY_EXCEEDED");
}

#[test]
fn query_at_the_budget_is_planned() {
    let info = info_with_max_complexity(3, three_relations());

    assert!(plan(&info).is_ok());
}

#[test]
fn scalars_do_not_count_towards_the_budget() {
    let info = info_with_max_complexity(
        0,
        FieldNode::with_name("tasks").fields(["name", "done", "priority", "project"]),
    );

    assert!(plan(&info).is_ok());
}

#[test]
fn compiler_limit_can_be_overridden() {
    let info = info_with_max_complexity(10, three_relations());
    let queryset = info.return_type().unwrap().get_queryset(&info).unwrap();

    let result = OptimizationCompiler::new(&info).with_max_complexity(1).compile(&queryset);

    assert!(matches!(result, Err(CoreError::ComplexityExceeded { max: 1 })));
}
