use query_core::{
    CoreResult, DeclarativeFilterSet, DeclarativeOrderSet, FieldNode, FilterDefinition, InterfaceType, ObjectType,
    OptimizerSettings, OrderDefinition, OutputField, QuerySchema, QuerySchemaRef, ResolveInfo, UnionType, optimize,
};
use query_structure::{Datamodel, DatamodelRef, Expression, Filter, NullsOrder, QuerySet};

/// Project management models.
///
/// - `Project` is owned by a `Person` and has many `Task`s.
/// - `Task` belongs to a `Project` and is assigned to many `Person`s.
/// - `Comment` points to a `Project` or a `Task` through the generic foreign key `target`.
pub fn datamodel() -> DatamodelRef {
    Datamodel::builder()
        .model("ContentType", |m| m.scalars(["app_label", "model"]))
        .model("Person", |m| {
            m.scalars(["name", "email"])
                .many_to_many("assigned_tasks", "Task")
                .reverse_foreign_key("owned_projects", "Project", "owner")
                .reverse_one_to_one("profile", "Profile", "person")
        })
        .model("Profile", |m| m.scalar("bio").one_to_one("person", "Person"))
        .model("Project", |m| {
            m.scalars(["name", "archived"])
                .foreign_key("owner", "Person")
                .reverse_foreign_key("tasks", "Task", "project")
                .generic_relation("comments", "Comment", "target")
        })
        .model("Task", |m| {
            m.scalars(["name", "done", "priority", "due_date"])
                .foreign_key("project", "Project")
                .many_to_many("assignees", "Person")
                .generic_relation("comments", "Comment", "target")
        })
        .model("Comment", |m| {
            m.scalars(["body", "object_id"])
                .foreign_key("content_type", "ContentType")
                .foreign_key("author", "Person")
                .generic_foreign_key("target", "content_type", "object_id")
        })
        .build()
        .expect("fixture datamodel is valid")
}

pub fn task_filters() -> DeclarativeFilterSet {
    DeclarativeFilterSet::new("TaskFilterSet")
        .filter("nameContains", FilterDefinition::new("name__icontains"))
        .filter("done", FilterDefinition::new("done"))
        .filter("projectName", FilterDefinition::new("project__name__icontains"))
        .filter("assigneeName", FilterDefinition::new("assignees__name").distinct())
        .filter(
            "minAssignees",
            FilterDefinition::new("assignee_count__gte").alias("assignee_count", Expression::count("assignees")),
        )
}

pub fn comment_filters() -> DeclarativeFilterSet {
    DeclarativeFilterSet::new("CommentFilterSet").filter("bodyContains", FilterDefinition::new("body__icontains"))
}

pub fn task_ordering() -> DeclarativeOrderSet {
    DeclarativeOrderSet::new("TaskOrderSet")
        .order("name", OrderDefinition::field("name"))
        .order("priority", OrderDefinition::field("priority").nulls(NullsOrder::Last))
        .order(
            "assigneeCount",
            OrderDefinition::aliased("assignee_count", Expression::count("assignees")),
        )
}

pub fn schema() -> QuerySchemaRef {
    schema_with_settings(OptimizerSettings::default())
}

/// The fixture schema. Types:
///
/// - `PersonType`, `ProfileType`, `ProjectType`, `TaskType`, `CommentType`, bound to the
///   models of the same name.
/// - `ExternalLinkType`, not bound to a model.
/// - `Node`, an interface implemented by `ProjectType` and `TaskType`.
/// - `CommentTarget`, the union of `ProjectType` and `TaskType`.
/// - `Attachment`, a union of types without a model.
///
/// Archived projects are hidden by the base query set of `ProjectType`.
pub fn schema_with_settings(settings: OptimizerSettings) -> QuerySchemaRef {
    QuerySchema::builder(datamodel())
        .interface(InterfaceType::new("Node"))
        .union(UnionType::new("CommentTarget", ["ProjectType", "TaskType"]))
        .union(UnionType::new("Attachment", ["ExternalLinkType"]))
        .object(
            ObjectType::builder("PersonType")
                .model("Person")
                .scalars(["id", "name", "email"])
                .field(OutputField::relation("assignedTasks", "TaskType").source("assigned_tasks"))
                .field(OutputField::relation("ownedProjects", "ProjectType").source("owned_projects"))
                .field(OutputField::relation("profile", "ProfileType")),
        )
        .object(ObjectType::builder("ProfileType").model("Profile").scalars(["bio"]))
        .object(
            ObjectType::builder("ProjectType")
                .model("Project")
                .interface("Node")
                .scalars(["id", "name"])
                .field(OutputField::relation("owner", "PersonType"))
                .field(OutputField::relation("tasks", "TaskType"))
                .field(OutputField::relation("comments", "CommentType"))
                .field(OutputField::expression("taskCount", Expression::count("tasks")))
                .get_queryset(|queryset, _| Ok(queryset.filter(Filter::lookup("archived", false)))),
        )
        .object(
            ObjectType::builder("TaskType")
                .model("Task")
                .interface("Node")
                .scalars(["id", "name", "done", "priority"])
                .field(OutputField::scalar("projectId").source("project_id"))
                .field(OutputField::relation("project", "ProjectType"))
                .field(OutputField::relation("assignees", "PersonType"))
                .field(OutputField::relation("comments", "CommentType"))
                .field(OutputField::expression(
                    "assigneeCount",
                    Expression::count("assignees").distinct(),
                ))
                .field(OutputField::custom("summary"))
                .field(OutputField::custom("isOverdue").optimizer_hook(|optimizer, _, _| {
                    optimizer.add_only_fields(["due_date".to_owned(), "done".to_owned()]);
                    Ok(())
                }))
                .filterset(task_filters())
                .orderset(task_ordering()),
        )
        .object(
            ObjectType::builder("CommentType")
                .model("Comment")
                .scalars(["id", "body"])
                .field(OutputField::relation("author", "PersonType"))
                .field(OutputField::relation("target", "CommentTarget"))
                .field(OutputField::relation("attachment", "Attachment").source("target"))
                .filterset(comment_filters()),
        )
        .object(ObjectType::builder("ExternalLinkType").field(OutputField::custom("url")))
        .query_field(OutputField::custom("tasks").of_type("TaskType"))
        .query_field(OutputField::custom("projects").of_type("ProjectType"))
        .query_field(OutputField::custom("people").of_type("PersonType"))
        .query_field(OutputField::custom("comments").of_type("CommentType"))
        .settings(settings)
        .build()
        .expect("fixture schema is valid")
}

/// Resolve info for a root field of the fixture schema.
pub fn resolve_info(field_node: FieldNode) -> ResolveInfo {
    ResolveInfo::new(schema(), field_node)
}

/// Plans the query set of a root field the way a resolver would.
pub fn plan(info: &ResolveInfo) -> CoreResult<QuerySet> {
    let queryset = info.return_type()?.get_queryset(info)?;
    optimize(queryset, info)
}
