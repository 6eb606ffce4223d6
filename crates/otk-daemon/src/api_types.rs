//! Response/request types owned by the HTTP boundary, plus the mapping from
//! service errors to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use otk_orders::OrderError;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Clone, Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for `PUT /orders/{id}`.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateStatusQuery {
    pub status: String,
}

/// Newtype so `OrderError` can flow out of handlers with `?`.
///
/// Validation → 400, NotFound → 404, store failures → 500. Store failure
/// details stay in the log; the client only sees a generic message.
pub struct ApiError(pub OrderError);

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            OrderError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            OrderError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            OrderError::Store(e) => {
                error!(error = %e, "order store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "order store failure".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
