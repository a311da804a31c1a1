//! Production order endpoints

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;

use super::ProductionAppState;
use super::models::*;
use crate::application::errors::ApplicationError;
use crate::application::production::ProductionOrderDetails;
use crate::presentation::auth::extractors::AuthUser;
use crate::presentation::models::{ApiJson, ApiPath, ErrorResponse};

/// List production orders
#[utoipa::path(
    get,
    path = "/api/productionorders",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Live orders, newest first", body = Vec<ProductionOrderDto>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_orders(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<ProductionOrderDto>>, ApplicationError> {
    let now = Utc::now();
    let orders = state.list_orders_use_case.execute().await?;
    Ok(Json(
        orders
            .into_iter()
            .map(|details| ProductionOrderDto::from_details(details, now))
            .collect(),
    ))
}

/// Get one production order with its jobs
#[utoipa::path(
    get,
    path = "/api/productionorders/{id}",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = ProductionOrderDto),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn get_order(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<ProductionOrderDto>, ApplicationError> {
    let details = state.get_order_use_case.execute(id).await?;
    Ok(Json(ProductionOrderDto::from_details(details, Utc::now())))
}

/// Create a production order
#[utoipa::path(
    post,
    path = "/api/productionorders",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    request_body = CreateProductionOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ProductionOrderDto),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_order(
    State(state): State<ProductionAppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateProductionOrderRequest>,
) -> Result<Response, ApplicationError> {
    let input = request.into_input()?;
    let order = state
        .create_order_use_case
        .execute(input, Some(auth.username))
        .await?;

    let location = format!("/api/productionorders/{}", order.id);
    let dto = ProductionOrderDto::from_details(
        ProductionOrderDetails {
            order,
            jobs: Vec::new(),
        },
        Utc::now(),
    );

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(dto)).into_response())
}

/// Partially update a production order
#[utoipa::path(
    put,
    path = "/api/productionorders/{id}",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateProductionOrderRequest,
    responses(
        (status = 204, description = "Order updated"),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn update_order(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateProductionOrderRequest>,
) -> Result<StatusCode, ApplicationError> {
    let changes = request.into_changes()?;
    state.update_order_use_case.execute(id, changes).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft delete a production order and its jobs
#[utoipa::path(
    delete,
    path = "/api/productionorders/{id}",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = ErrorResponse)
    )
)]
pub async fn delete_order(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApplicationError> {
    state.delete_order_use_case.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order dashboard counters
#[utoipa::path(
    get,
    path = "/api/productionorders/statistics",
    tag = "production-orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counters over live orders", body = OrderStatisticsDto)
    )
)]
pub async fn order_statistics(
    State(state): State<ProductionAppState>,
    _auth: AuthUser,
) -> Result<Json<OrderStatisticsDto>, ApplicationError> {
    let statistics = state.order_statistics_use_case.execute().await?;
    Ok(Json(statistics.into()))
}
