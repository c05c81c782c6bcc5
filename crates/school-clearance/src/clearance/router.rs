use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::board::BoardQuery;
use super::decision::DecisionRequest;
use super::domain::{
    ClearanceItemFields, ClearanceItemId, DepartmentFields, DepartmentId, StudentId,
};
use super::repository::ClearanceStore;
use super::service::{ClearanceError, ClearanceService};

type SharedService<S> = Arc<ClearanceService<S>>;

/// Router builder exposing the clearance engine over HTTP.
pub fn clearance_router<S>(service: SharedService<S>) -> Router
where
    S: ClearanceStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/clearance/departments",
            get(list_departments_handler::<S>).post(create_department_handler::<S>),
        )
        .route(
            "/api/v1/clearance/departments/:department_id",
            get(get_department_handler::<S>)
                .put(update_department_handler::<S>)
                .delete(delete_department_handler::<S>),
        )
        .route(
            "/api/v1/clearance/items",
            get(list_items_handler::<S>).post(create_item_handler::<S>),
        )
        .route(
            "/api/v1/clearance/items/:item_id",
            put(update_item_handler::<S>).delete(delete_item_handler::<S>),
        )
        .route(
            "/api/v1/clearance/decisions",
            post(record_decision_handler::<S>),
        )
        .route("/api/v1/clearance/students", get(board_handler::<S>))
        .route("/api/v1/clearance/board.csv", get(board_export_handler::<S>))
        .route(
            "/api/v1/clearance/students/:student_id",
            get(student_summary_handler::<S>),
        )
        .route(
            "/api/v1/clearance/students/:student_id/certificate",
            get(certificate_handler::<S>),
        )
        .route("/api/v1/clearance/audit", get(audit_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ItemQuery {
    #[serde(default)]
    department_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct YearQuery {
    #[serde(default)]
    academic_year: Option<String>,
}

pub(crate) fn error_response(error: ClearanceError) -> Response {
    let status = error.status_code();
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, ClearanceError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_departments_handler<S>(
    State(service): State<SharedService<S>>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(StatusCode::OK, service.list_departments())
}

pub(crate) async fn get_department_handler<S>(
    State(service): State<SharedService<S>>,
    Path(department_id): Path<String>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service.get_department(&DepartmentId(department_id)),
    )
}

pub(crate) async fn create_department_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(fields): axum::Json<DepartmentFields>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service
            .create_department(fields)
            .map(|id| json!({ "id": id })),
    )
}

pub(crate) async fn update_department_handler<S>(
    State(service): State<SharedService<S>>,
    Path(department_id): Path<String>,
    axum::Json(fields): axum::Json<DepartmentFields>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service
            .update_department(&DepartmentId(department_id), fields)
            .map(|id| json!({ "id": id })),
    )
}

pub(crate) async fn delete_department_handler<S>(
    State(service): State<SharedService<S>>,
    Path(department_id): Path<String>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service.delete_department(&DepartmentId(department_id)),
    )
}

pub(crate) async fn list_items_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<ItemQuery>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    let department_id = query.department_id.map(DepartmentId);
    respond(StatusCode::OK, service.list_items(department_id.as_ref()))
}

pub(crate) async fn create_item_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(fields): axum::Json<ClearanceItemFields>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::CREATED,
        service.create_item(fields).map(|id| json!({ "id": id })),
    )
}

pub(crate) async fn update_item_handler<S>(
    State(service): State<SharedService<S>>,
    Path(item_id): Path<String>,
    axum::Json(fields): axum::Json<ClearanceItemFields>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service
            .update_item(&ClearanceItemId(item_id), fields)
            .map(|id| json!({ "id": id })),
    )
}

pub(crate) async fn delete_item_handler<S>(
    State(service): State<SharedService<S>>,
    Path(item_id): Path<String>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service
            .delete_item(&ClearanceItemId(item_id))
            .map(|id| json!({ "id": id })),
    )
}

pub(crate) async fn record_decision_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    match service.record_decision(request, Utc::now()) {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(outcome)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn board_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<BoardQuery>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(StatusCode::OK, service.board(&query))
}

pub(crate) async fn board_export_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<BoardQuery>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    let csv = service
        .board(&query)
        .and_then(|board| board.to_csv().map_err(ClearanceError::from));
    match csv {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn student_summary_handler<S>(
    State(service): State<SharedService<S>>,
    Path(student_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service.student_summary(&StudentId(student_id), query.academic_year.as_deref()),
    )
}

pub(crate) async fn certificate_handler<S>(
    State(service): State<SharedService<S>>,
    Path(student_id): Path<String>,
    Query(query): Query<YearQuery>,
) -> Response
where
    S: ClearanceStore + 'static,
{
    let issued_on = Utc::now().date_naive();
    respond(
        StatusCode::OK,
        service.certificate(
            &StudentId(student_id),
            query.academic_year.as_deref(),
            issued_on,
        ),
    )
}

pub(crate) async fn audit_handler<S>(State(service): State<SharedService<S>>) -> Response
where
    S: ClearanceStore + 'static,
{
    respond(
        StatusCode::OK,
        service.audit().map(|findings| {
            let described: Vec<_> = findings
                .iter()
                .map(|finding| {
                    json!({
                        "finding": finding,
                        "description": finding.describe(),
                    })
                })
                .collect();
            json!({ "count": findings.len(), "findings": described })
        }),
    )
}
