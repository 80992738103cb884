//! Translation editor handlers: login, read/update/import, WebSocket entry.
//!
//! Mutations broadcast their effect to every connected editor so open
//! editor views stay consistent without polling.

use std::collections::HashSet;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::dispatch::RequestContext;
use crate::http::response;
use crate::http::server::AppState;
use crate::realtime::{socket, ServerMessage};
use crate::routing::Params;
use crate::security::session::{
    cookie_value, serialize_cookie, session_cookie_name, WS_SESSION_COOKIE,
};
use crate::translations::{StoreError, Translation};

/// Strip markup from editor-supplied fields; translations are plain text.
fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Prune locks for keys that no longer exist and return the surviving
/// owners snapshot for broadcast payloads.
async fn current_locks(state: &AppState) -> std::collections::HashMap<String, String> {
    match state.translations.get().await {
        Ok(translations) => {
            let keys: HashSet<String> = translations.keys().cloned().collect();
            state.locks.retain(&keys)
        }
        Err(error) => {
            tracing::error!(%error, "failed to load translations for lock pruning");
            state.locks.owners()
        }
    }
}

fn map_store_error(error: StoreError) -> ApiError {
    match error {
        StoreError::UnknownKey(_) => ApiError::NotFound,
        StoreError::Storage(message) => ApiError::Upstream(message),
    }
}

#[derive(Deserialize)]
struct LoginForm {
    login: String,
    password: String,
}

/// `POST /login` — editor login; 302 to the editor UI with a session
/// cookie on success.
pub async fn login(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::POST {
        return Err(ApiError::NotFound);
    }
    let state = ctx.state;
    let Ok(Form(form)) = Form::<LoginForm>::from_request(ctx.request, &()).await else {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    };
    if form.login.is_empty() || form.password.is_empty() {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    }

    let authenticated = state
        .translations
        .authenticate(&form.login, &form.password)
        .await
        .map_err(map_store_error)?;
    if !authenticated {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    }

    let secure = state.config.session.secure_cookies;
    let cookie = serialize_cookie(
        session_cookie_name(secure),
        &state.sessions.create(),
        state.sessions.cookie_age(),
        secure,
    );
    response::redirect("/", Some(cookie))
}

/// `GET /api/v1/translations/status` — session probe. The dispatcher
/// already rejected invalid sessions with 401.
pub async fn status(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::GET {
        return Err(ApiError::NotFound);
    }
    Ok("ok".into_response())
}

/// `GET /api/v1/translations/get` — the full translations map.
pub async fn get_translations(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::GET {
        return Err(ApiError::NotFound);
    }
    let translations = ctx
        .state
        .translations
        .get()
        .await
        .map_err(map_store_error)?;
    response::json(translations)
}

#[derive(Deserialize)]
struct UpdateForm {
    key: String,
    lang: String,
    message: String,
}

/// `POST /api/v1/translations/update` — change one message, then broadcast
/// `UPDATE`. On persistence failure editors get a fresh `init` snapshot so
/// nobody keeps stale optimistic state.
pub async fn update(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::POST {
        return Err(ApiError::NotFound);
    }
    let state = ctx.state;
    let Ok(Form(form)) = Form::<UpdateForm>::from_request(ctx.request, &()).await else {
        return Err(ApiError::BadRequest("invalid form".into()));
    };

    let message = sanitize(&form.message);
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    let key = sanitize(&form.key);
    let lang = sanitize(&form.lang);

    let result = state
        .translations
        .add(
            &key,
            Translation {
                lang: lang.clone(),
                message: message.clone(),
            },
        )
        .await;

    match result {
        Ok(()) => {
            let locks = current_locks(&state).await;
            state.hub.publish(&ServerMessage::Update {
                key,
                lang,
                message,
                locks,
            });
            Ok("Translation updated".into_response())
        }
        Err(error) => {
            // Editors may have applied the change optimistically; resync.
            let locks = current_locks(&state).await;
            state.hub.publish(&ServerMessage::Init { locks });
            Err(map_store_error(error))
        }
    }
}

const IMPORT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// `POST /api/v1/translations/import/:language` — bulk import from the
/// extraction pipeline. Broadcasts `IMPORT` with the new map and the lock
/// snapshot pruned of deleted keys; on failure broadcasts locks only.
pub async fn import(ctx: RequestContext, params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::POST {
        return Err(ApiError::NotFound);
    }
    let language = params.get("language").cloned().ok_or(ApiError::NotFound)?;
    let state = ctx.state;

    let bytes = axum::body::to_bytes(ctx.request.into_body(), IMPORT_BODY_LIMIT)
        .await
        .map_err(|_| ApiError::BadRequest("unreadable body".into()))?;
    let extracted = match serde_json::from_slice(&bytes) {
        Ok(extracted) => extracted,
        Err(error) => {
            return Err(ApiError::BadRequest(format!("invalid extraction: {error}")));
        }
    };

    match state.translations.import(&language, extracted).await {
        Ok(translations) => {
            let locks = current_locks(&state).await;
            state.hub.publish(&ServerMessage::Import {
                translations: Some(translations.clone()),
                locks,
            });
            response::json(translations)
        }
        Err(error) => {
            tracing::error!(%error, "translation import failed");
            let locks = current_locks(&state).await;
            state.hub.publish(&ServerMessage::Import {
                translations: None,
                locks,
            });
            Err(map_store_error(error))
        }
    }
}

#[derive(Deserialize)]
struct UpsertUserInput {
    login: String,
    password: String,
}

/// `POST /api/v1/translations/upsert-user` — create or update an editor
/// account (automation only).
pub async fn upsert_user(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    if ctx.request.method() != Method::POST {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    }
    let state = ctx.state;
    let bytes = axum::body::to_bytes(ctx.request.into_body(), 64 * 1024)
        .await
        .map_err(|_| ApiError::BadRequest("unreadable body".into()))?;
    let Ok(input) = serde_json::from_slice::<UpsertUserInput>(&bytes) else {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    };
    if input.login.is_empty() || input.password.is_empty() {
        return Ok(response::status(StatusCode::BAD_REQUEST));
    }
    state
        .translations
        .upsert_user(&input.login, &input.password)
        .await
        .map_err(map_store_error)?;
    Ok(response::status(StatusCode::OK))
}

/// `GET /api/v1/translations/ws` — upgrade to the editor WebSocket. The
/// dispatcher validated the session; here the connection gets its owner id
/// (from the `WS_SESSION` cookie, or freshly minted) and is handed to the
/// socket task. The returned response is the protocol-switch sentinel: the
/// transport has taken over the connection.
pub async fn websocket(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    let state = ctx.state;
    let (mut parts, _body) = ctx.request.into_parts();

    let owner_id = parts
        .headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, WS_SESSION_COOKIE))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let upgrade = WebSocketUpgrade::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| ApiError::BadRequest("not a websocket upgrade".into()))?;

    let cookie = serialize_cookie(
        WS_SESSION_COOKIE,
        &owner_id,
        state.sessions.cookie_age(),
        state.config.session.secure_cookies,
    );

    let mut response =
        upgrade.on_upgrade(move |socket| socket::run_connection(socket, owner_id, state));
    if let Ok(value) = header::HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(sanitize("<b>hello</b> world"), "hello world");
        assert_eq!(sanitize("plain"), "plain");
        assert_eq!(sanitize("  padded  "), "padded");
        assert_eq!(sanitize("<script>alert(1)</script>"), "alert(1)");
    }

    #[test]
    fn test_sanitize_empty_result() {
        assert_eq!(sanitize("<br/>"), "");
        assert_eq!(sanitize("   "), "");
    }
}
