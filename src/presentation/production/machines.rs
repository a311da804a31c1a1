//! Machine endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};

use super::ProductionAppState;
use super::models::*;
use crate::application::errors::ApplicationError;
use crate::presentation::auth::extractors::AuthUser;
use crate::presentation::models::{ApiJson, ApiPath, ErrorResponse};

/// List active machines
#[utoipa::path(
    get,
    path = "/api/machines",
    tag = "machines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active machines with their current job", body = Vec<MachineDto>)
    )
)]
pub async fn list_machines(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<MachineDto>>, ApplicationError> {
    let machines = state.list_machines_use_case.execute().await?;
    Ok(Json(machines.into_iter().map(MachineDto::from).collect()))
}

/// Get one active machine
#[utoipa::path(
    get,
    path = "/api/machines/{id}",
    tag = "machines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Machine id")),
    responses(
        (status = 200, description = "Machine found", body = MachineDto),
        (status = 404, description = "Machine missing or inactive", body = ErrorResponse)
    )
)]
pub async fn get_machine(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MachineDto>, ApplicationError> {
    let machine = state.get_machine_use_case.execute(id).await?;
    Ok(Json(machine.into()))
}

/// Report a machine's status and utilization
#[utoipa::path(
    put,
    path = "/api/machines/{id}/status",
    tag = "machines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Machine id")),
    request_body = UpdateMachineStatusRequest,
    responses(
        (status = 204, description = "Status updated"),
        (status = 400, description = "Invalid status or utilization", body = ErrorResponse),
        (status = 404, description = "Machine missing or inactive", body = ErrorResponse)
    )
)]
pub async fn update_machine_status(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateMachineStatusRequest>,
) -> Result<StatusCode, ApplicationError> {
    let update = request.into_update()?;
    state
        .update_machine_status_use_case
        .execute(id, update)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Machine dashboard counters
#[utoipa::path(
    get,
    path = "/api/machines/statistics",
    tag = "machines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters over active machines", body = MachineStatisticsDto)
    )
)]
pub async fn machine_statistics(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
) -> Result<Json<MachineStatisticsDto>, ApplicationError> {
    let statistics = state.machine_statistics_use_case.execute().await?;
    Ok(Json(statistics.into()))
}
