use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::error::ServiceError;

/// JSON body extractor that keeps rejections inside the response envelope.
///
/// Axum's plain `Json<T>` answers malformed or wrongly-typed bodies with its
/// own plain-text rejection (422/415). Every body this API accepts goes
/// through `ApiJson` instead, so those failures surface as a 400 with the
/// standard `{"success": false, "error": ...}` shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ServiceError::Validation(rejection.body_text())),
        }
    }
}
