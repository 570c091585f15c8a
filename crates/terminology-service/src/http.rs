//! HTTP routes.
//!
//! Operation endpoints read their parameters from the query string and
//! answer with the bare JSON payload. Failures carry an [`ErrorResponse`]
//! body and the matching status code. `POST /` accepts any request tagged by
//! `operation`.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::protocol::{
    ErrorResponse, ExpandRequest, LookupRequest, Request, Response, SubsumesRequest,
    TranslateRequest, ValidateCodeRequest, ValidateValueSetCodeRequest,
};
use crate::server::TerminologyServer;

/// Builds the router serving every terminology operation.
pub fn router(server: TerminologyServer) -> Router {
    Router::new()
        .route("/", post(operation))
        .route("/CodeSystem/$lookup", get(lookup))
        .route("/CodeSystem/$validate-code", get(validate_code))
        .route("/CodeSystem/$subsumes", get(subsumes))
        .route("/ValueSet/$expand", get(expand))
        .route("/ValueSet/:id/$expand", get(expand_by_id))
        .route("/ValueSet/$validate-code", get(validate_value_set_code))
        .route("/ValueSet/:id/$validate-code", get(validate_value_set_code_by_id))
        .route("/ConceptMap/$translate", get(translate))
        .route("/ConceptMap/:id/$translate", get(translate_by_id))
        .with_state(server)
}

impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Response::Error(err) => {
                StatusCode::from_u16(err.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

type QueryResult<T> = Result<Query<T>, QueryRejection>;

fn dispatch<T>(
    server: &TerminologyServer,
    query: QueryResult<T>,
    request: impl FnOnce(T) -> Request,
) -> Response {
    match query {
        Ok(Query(params)) => server.handle(&request(params)),
        Err(rejection) => {
            tracing::debug!("Rejected query string: {}", rejection);
            ErrorResponse::bad_request(rejection.body_text()).into()
        }
    }
}

/// POST [base]/
async fn operation(State(server): State<TerminologyServer>, body: String) -> Response {
    server.handle_json(&body)
}

/// GET [base]/CodeSystem/$lookup
///
/// `property` may repeat, so the query is read as pairs.
async fn lookup(
    State(server): State<TerminologyServer>,
    query: QueryResult<Vec<(String, String)>>,
) -> Response {
    dispatch(&server, query, |pairs| {
        let mut request = LookupRequest::default();
        for (key, value) in pairs {
            match key.as_str() {
                "system" => request.system = value,
                "version" => request.version = Some(value),
                "code" => request.code = value,
                "property" => request.properties.push(value),
                _ => {}
            }
        }
        Request::Lookup(request)
    })
}

/// GET [base]/CodeSystem/$validate-code
async fn validate_code(
    State(server): State<TerminologyServer>,
    query: QueryResult<ValidateCodeRequest>,
) -> Response {
    dispatch(&server, query, Request::ValidateCode)
}

/// GET [base]/CodeSystem/$subsumes
async fn subsumes(
    State(server): State<TerminologyServer>,
    query: QueryResult<SubsumesRequest>,
) -> Response {
    dispatch(&server, query, Request::Subsumes)
}

/// GET [base]/ValueSet/$expand
async fn expand(
    State(server): State<TerminologyServer>,
    query: QueryResult<ExpandRequest>,
) -> Response {
    dispatch(&server, query, Request::Expand)
}

/// GET [base]/ValueSet/{id}/$expand
async fn expand_by_id(
    State(server): State<TerminologyServer>,
    Path(id): Path<String>,
    query: QueryResult<ExpandRequest>,
) -> Response {
    dispatch(&server, query, |request| {
        Request::Expand(ExpandRequest {
            id: Some(id),
            ..request
        })
    })
}

/// GET [base]/ValueSet/$validate-code
async fn validate_value_set_code(
    State(server): State<TerminologyServer>,
    query: QueryResult<ValidateValueSetCodeRequest>,
) -> Response {
    dispatch(&server, query, Request::ValidateValueSetCode)
}

/// GET [base]/ValueSet/{id}/$validate-code
async fn validate_value_set_code_by_id(
    State(server): State<TerminologyServer>,
    Path(id): Path<String>,
    query: QueryResult<ValidateValueSetCodeRequest>,
) -> Response {
    dispatch(&server, query, |request| {
        Request::ValidateValueSetCode(ValidateValueSetCodeRequest {
            id: Some(id),
            ..request
        })
    })
}

/// GET [base]/ConceptMap/$translate
async fn translate(
    State(server): State<TerminologyServer>,
    query: QueryResult<TranslateRequest>,
) -> Response {
    dispatch(&server, query, Request::Translate)
}

/// GET [base]/ConceptMap/{id}/$translate
async fn translate_by_id(
    State(server): State<TerminologyServer>,
    Path(id): Path<String>,
    query: QueryResult<TranslateRequest>,
) -> Response {
    dispatch(&server, query, |request| {
        Request::Translate(TranslateRequest {
            id: Some(id),
            ..request
        })
    })
}
