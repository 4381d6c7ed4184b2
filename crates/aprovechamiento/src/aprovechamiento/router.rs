use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::domain::{CalculationRequest, TreatmentParameters};
use super::service::AprovechamientoService;
use crate::catalog::TreatmentCatalog;

/// Router builder exposing the calculation and catalog endpoints.
pub fn aprovechamiento_router<C>(service: Arc<AprovechamientoService<C>>) -> Router
where
    C: TreatmentCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/aprovechamiento/calcular",
            post(calculate_handler::<C>),
        )
        .route("/api/v1/tratamientos", get(list_handler::<C>))
        .route("/api/v1/tratamientos/:code", get(treatment_handler::<C>))
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct TreatmentListView<'a> {
    pub fetched_at: DateTime<Utc>,
    pub tratamientos: Vec<&'a TreatmentParameters>,
}

pub(crate) async fn calculate_handler<C>(
    State(service): State<Arc<AprovechamientoService<C>>>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response
where
    C: TreatmentCatalog + 'static,
{
    let result = service.calculate(&request).await;
    let status = if result.is_error() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, axum::Json(result)).into_response()
}

pub(crate) async fn list_handler<C>(
    State(service): State<Arc<AprovechamientoService<C>>>,
) -> Response
where
    C: TreatmentCatalog + 'static,
{
    match service.treatments().await {
        Ok(table) => {
            let view = TreatmentListView {
                fetched_at: table.fetched_at(),
                tratamientos: table.sorted(),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => catalog_unavailable(err.to_string()),
    }
}

pub(crate) async fn treatment_handler<C>(
    State(service): State<Arc<AprovechamientoService<C>>>,
    Path(code): Path<String>,
) -> Response
where
    C: TreatmentCatalog + 'static,
{
    match service.treatment(&code).await {
        Ok(Some(parameters)) => (StatusCode::OK, axum::Json(parameters)).into_response(),
        Ok(None) => {
            let payload = json!({
                "codigo": code,
                "error": "treatment not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => catalog_unavailable(err.to_string()),
    }
}

fn catalog_unavailable(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
}
