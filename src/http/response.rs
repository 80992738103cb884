//! Response helpers.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;

/// Plain JSON response.
pub fn json<T: Serialize>(data: T) -> Result<Response, ApiError> {
    Ok(Json(data).into_response())
}

/// JSON response with extra headers (cache control, set-cookie).
pub fn json_with_headers<T: Serialize>(
    data: T,
    headers: &[(HeaderName, String)],
) -> Result<Response, ApiError> {
    let mut response = Json(data).into_response();
    for (name, value) in headers {
        let value = HeaderValue::from_str(value).map_err(|_| ApiError::Internal)?;
        response.headers_mut().insert(name.clone(), value);
    }
    Ok(response)
}

/// Empty response with a status code.
pub fn status(code: StatusCode) -> Response {
    code.into_response()
}

/// 302 redirect, optionally setting a cookie.
pub fn redirect(location: &str, set_cookie: Option<String>) -> Result<Response, ApiError> {
    let mut response = StatusCode::FOUND.into_response();
    response.headers_mut().insert(
        header::LOCATION,
        HeaderValue::from_str(location).map_err(|_| ApiError::Internal)?,
    );
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_str(&cookie).map_err(|_| ApiError::Internal)?,
        );
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_with_headers() {
        let response = json_with_headers(
            serde_json::json!({"ok": true}),
            &[(header::CACHE_CONTROL, "no-store".to_string())],
        )
        .unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }

    #[test]
    fn test_redirect_sets_location_and_cookie() {
        let response = redirect("/", Some("session=tok; Path=/".into())).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }
}
