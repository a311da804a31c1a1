//! Production job endpoints

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};

use super::ProductionAppState;
use super::models::*;
use crate::application::errors::ApplicationError;
use crate::presentation::auth::extractors::AuthUser;
use crate::presentation::models::{ApiJson, ApiPath, ErrorResponse};

/// List the jobs of an order in board order
#[utoipa::path(
    get,
    path = "/api/productionorders/{id}/jobs",
    tag = "production-jobs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Jobs by sort order", body = Vec<ProductionJobDto>),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn list_jobs(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(order_id): ApiPath<i32>,
) -> Result<Json<Vec<ProductionJobDto>>, ApplicationError> {
    let jobs = state.list_jobs_use_case.execute(order_id).await?;
    Ok(Json(jobs.into_iter().map(ProductionJobDto::from).collect()))
}

/// Append a job to an order
#[utoipa::path(
    post,
    path = "/api/productionorders/{id}/jobs",
    tag = "production-jobs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    request_body = CreateProductionJobRequest,
    responses(
        (status = 201, description = "Job scheduled", body = ProductionJobDto),
        (status = 400, description = "Validation failed or unknown machine", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn create_job(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(order_id): ApiPath<i32>,
    ApiJson(request): ApiJson<CreateProductionJobRequest>,
) -> Result<Response, ApplicationError> {
    let job = state
        .create_job_use_case
        .execute(order_id, request.into())
        .await?;

    let location = format!("/api/productionjobs/{}", job.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductionJobDto::from(job)),
    )
        .into_response())
}

/// Partially update a job
#[utoipa::path(
    put,
    path = "/api/productionjobs/{id}",
    tag = "production-jobs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Job id")),
    request_body = UpdateProductionJobRequest,
    responses(
        (status = 204, description = "Job updated"),
        (status = 400, description = "Validation failed or unknown machine", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
pub async fn update_job(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateProductionJobRequest>,
) -> Result<StatusCode, ApplicationError> {
    let changes = request.into_changes()?;
    state.update_job_use_case.execute(id, changes).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft delete a job
#[utoipa::path(
    delete,
    path = "/api/productionjobs/{id}",
    tag = "production-jobs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Job id")),
    responses(
        (status = 204, description = "Job deleted"),
        (status = 404, description = "Job not found", body = ErrorResponse)
    )
)]
pub async fn delete_job(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApplicationError> {
    state.delete_job_use_case.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rewrite the board order of an order's jobs
#[utoipa::path(
    put,
    path = "/api/productionorders/{id}/jobs/order",
    tag = "production-jobs",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    request_body = ReorderJobsRequest,
    responses(
        (status = 204, description = "Jobs reordered"),
        (status = 400, description = "Ids are not a permutation of the order's jobs", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn reorder_jobs(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(order_id): ApiPath<i32>,
    ApiJson(request): ApiJson<ReorderJobsRequest>,
) -> Result<StatusCode, ApplicationError> {
    state
        .reorder_jobs_use_case
        .execute(order_id, &request.job_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
