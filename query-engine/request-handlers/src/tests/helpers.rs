use crate::{GQLResponse, GraphqlBody, OptimizeRequestHandler};
use query_core::{OptimizerSettings, QuerySchemaRef};

pub(crate) fn handle(query: &str) -> GQLResponse {
    handle_body(GraphqlBody::new(query))
}

pub(crate) fn handle_body(body: GraphqlBody) -> GQLResponse {
    handle_with_schema(&test_setup::schema(), body)
}

pub(crate) fn handle_with_settings(settings: OptimizerSettings, query: &str) -> GQLResponse {
    handle_with_schema(&test_setup::schema_with_settings(settings), GraphqlBody::new(query))
}

fn handle_with_schema(schema: &QuerySchemaRef, body: GraphqlBody) -> GQLResponse {
    test_setup::init_logger();
    OptimizeRequestHandler::new(schema).handle(body)
}

/// The only error of a response that has no data.
pub(crate) fn single_error(response: &GQLResponse) -> (&str, &str) {
    assert!(response.data.is_empty(), "unexpected data: {:?}", response.data);
    assert_eq!(response.errors.len(), 1, "expected one error: {:?}", response.errors);

    let error = &response.errors[0];
    (error.code(), error.message())
}
