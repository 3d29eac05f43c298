pub mod health;
pub mod receipt;
pub mod receipt_image;

use axum::extract::{FromRequest, Query, Request};
use axum::http::{header, Method};
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use crate::models::ReceiptParams;
use crate::utils::errors::ReceiptError;

/// Receipt parameters from the query string (GET) or the request body (POST).
/// POST bodies may be JSON or `application/x-www-form-urlencoded`.
pub struct ReceiptInput(pub ReceiptParams);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<S> FromRequest<S> for ReceiptInput
where
    S: Send + Sync,
{
    type Rejection = ReceiptError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() != Method::POST {
            let Query(params) = Query::<ReceiptParams>::try_from_uri(req.uri())
                .map_err(|e| ReceiptError::InvalidRequest(e.body_text()))?;
            return Ok(Self(params));
        }

        if is_form(&req) {
            let Form(params) = Form::<ReceiptParams>::from_request(req, state)
                .await
                .map_err(|e| ReceiptError::InvalidRequest(e.body_text()))?;
            Ok(Self(params))
        } else {
            let JsonBody(params) = JsonBody::<ReceiptParams>::from_request(req, state).await?;
            Ok(Self(params))
        }
    }
}

/// `Json` whose rejections come back as the usual JSON error body
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ReceiptError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ReceiptError::InvalidRequest(e.body_text()))?;
        Ok(Self(value))
    }
}
