use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{AdmitId, RegistrationForm, StudentRecord, StudentUpdate, StudentView};
use super::repository::{ListQuery, PageInfo, RepositoryError, StudentRepository};
use super::service::{ServiceError, StudentService};

/// Router for the public endpoints: registration, admit-card fetch, phone
/// lookup, and result updates.
pub fn registry_router<R>(service: Arc<StudentService<R>>) -> Router
where
    R: StudentRepository + 'static,
{
    Router::new()
        .route("/api/students/register", post(register_handler::<R>))
        .route("/api/students/phone/:phone", get(phone_lookup_handler::<R>))
        .route("/api/students/:admit_id", get(admit_card_handler::<R>))
        .route(
            "/api/students/:admit_id/result",
            put(update_result_handler::<R>),
        )
        .with_state(service)
}

/// Router for the admin endpoints: listing, generic update, deletion.
///
/// Kept on its own router so an authorization layer can be slotted in
/// without reshaping the handlers; none is applied today.
pub fn admin_router<R>(service: Arc<StudentService<R>>) -> Router
where
    R: StudentRepository + 'static,
{
    Router::new()
        .route("/api/admin/students", get(list_handler::<R>))
        .route(
            "/api/admin/students/:admit_id",
            put(update_handler::<R>).delete(delete_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultUpdateRequest {
    #[serde(default)]
    pub(crate) result: String,
    #[serde(default)]
    pub(crate) score: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    pub(crate) page: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) search: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    data: Vec<StudentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PageInfo>,
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Json(form): Json<RegistrationForm>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.register(form).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "data": record.receipt(),
                "message": "Registration successful"
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ServiceError::Validation(err)) => bad_request(&err.to_string()),
        Err(ServiceError::Repository(RepositoryError::Duplicate)) => {
            bad_request("Duplicate admit id generated, please retry registration")
        }
        Err(other) => server_error("registration failed", &other),
    }
}

pub(crate) async fn admit_card_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Path(admit_id): Path<String>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.admit_card(&AdmitId(admit_id)).await {
        Ok(record) => success_data(record.view()),
        Err(ServiceError::Repository(RepositoryError::NotFound)) => {
            not_found("No student found with this admit id")
        }
        Err(other) => server_error("fetching student failed", &other),
    }
}

pub(crate) async fn phone_lookup_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Path(phone): Path<String>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.find_by_phone(&phone).await {
        Ok(record) => success_data(record.phone_match_view()),
        Err(ServiceError::Repository(RepositoryError::NotFound)) => {
            not_found("No student found with this phone number")
        }
        Err(other) => server_error("phone lookup failed", &other),
    }
}

pub(crate) async fn update_result_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Path(admit_id): Path<String>,
    Json(request): Json<ResultUpdateRequest>,
) -> Response
where
    R: StudentRepository + 'static,
{
    let admit_id = AdmitId(admit_id);
    match service
        .update_result(&admit_id, &request.result, &request.score)
        .await
    {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "message": "Result updated successfully",
                "data": record.view()
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ServiceError::Repository(RepositoryError::NotFound)) => not_found("Student not found"),
        Err(other) => server_error("result update failed", &other),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: StudentRepository + 'static,
{
    let query = ListQuery {
        page: params.page,
        limit: params.limit,
        search: params.search,
    };

    match service.list(&query).await {
        Ok(page) => {
            let body = ListResponse {
                success: true,
                data: page.records.iter().map(StudentRecord::view).collect(),
                pagination: page.pagination,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => server_error("listing students failed", &err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Path(admit_id): Path<String>,
    Json(update): Json<StudentUpdate>,
) -> Response
where
    R: StudentRepository + 'static,
{
    let admit_id = AdmitId(admit_id);
    match service.update(&admit_id, &update).await {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "message": "Student updated successfully",
                "data": record.view()
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ServiceError::Repository(RepositoryError::NotFound)) => not_found("Student not found"),
        Err(other) => server_error("student update failed", &other),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<StudentService<R>>>,
    Path(admit_id): Path<String>,
) -> Response
where
    R: StudentRepository + 'static,
{
    match service.delete(&AdmitId(admit_id)).await {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": "Student deleted successfully"
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ServiceError::Repository(RepositoryError::NotFound)) => not_found("Student not found"),
        Err(other) => server_error("student deletion failed", &other),
    }
}

fn success_data<T: Serialize>(data: T) -> Response {
    let payload = json!({ "success": true, "data": data });
    (StatusCode::OK, Json(payload)).into_response()
}

fn bad_request(message: &str) -> Response {
    let payload = json!({ "success": false, "message": message });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn not_found(message: &str) -> Response {
    let payload = json!({ "success": false, "message": message });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn server_error(context: &str, err: &ServiceError) -> Response {
    error!(error = %err, "{context}");
    let payload = json!({
        "success": false,
        "message": format!("Server error: {context}")
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
