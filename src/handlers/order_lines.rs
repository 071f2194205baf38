//! Read-only order-line endpoints. Lines are mutated only through their
//! owning order, so this surface exposes lookups but no writes.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::errors::AppError;
use crate::AppState;

use super::orders::OrderLineResponse;

/// GET /order_lines
#[utoipa::path(
    get,
    path = "/order_lines",
    responses(
        (status = 200, description = "All order lines", body = [OrderLineResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order_lines"
)]
pub async fn list_order_lines(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let lines = web::block(move || state.orders.list_order_lines())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<OrderLineResponse> = lines.into_iter().map(OrderLineResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /order_lines/{id}
#[utoipa::path(
    get,
    path = "/order_lines/{id}",
    params(("id" = Uuid, Path, description = "Order line UUID")),
    responses(
        (status = 200, description = "Order line found", body = OrderLineResponse),
        (status = 404, description = "Order line not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "order_lines"
)]
pub async fn get_order_line(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let line = web::block(move || state.orders.get_order_line(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or_else(|| AppError::NotFound(format!("OrderLine with ID {} not found", id)))?;

    Ok(HttpResponse::Ok().json(OrderLineResponse::from(line)))
}
