//! Content API handlers (tarot cards, pages).
//!
//! Cacheable lookups go through the TTL cache and repopulate it on miss;
//! the random card draw is never cached.

use axum::http::{header, Method};
use axum::response::Response;
use serde::Deserialize;
use serde_json::Value;

use crate::content::{ContentError, ContentQuery};
use crate::error::ApiError;
use crate::http::dispatch::{has_valid_session, session_token, RequestContext};
use crate::http::response;
use crate::http::server::AppState;
use crate::routing::Params;
use crate::security::session::{serialize_cookie, session_cookie_name};
use crate::translations::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};

fn require(params: &Params, name: &str) -> Result<String, ApiError> {
    params.get(name).cloned().ok_or(ApiError::NotFound)
}

fn require_method(ctx: &RequestContext, method: Method) -> Result<(), ApiError> {
    if ctx.request.method() == method {
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}

/// Fetch content, serving and repopulating the cache for cacheable queries.
/// Cache failures degrade to a fetch; fetch failures surface as upstream
/// errors.
async fn cached_fetch(state: &AppState, query: &ContentQuery) -> Result<Value, ApiError> {
    let stale_time = state.config.cache.stale_time();
    let cache_key = query.cache_key();

    if let Some(key) = &cache_key {
        if let Some(cached) = state.cache.get_item(key, stale_time) {
            match serde_json::from_str(&cached) {
                Ok(value) => return Ok(value),
                Err(_) => state.cache.remove_item(key),
            }
        }
    }

    let value = state.content.fetch(query).await.map_err(|error| match error {
        ContentError::NotFound => ApiError::NotFound,
        ContentError::Request(message) => {
            tracing::error!(%message, "content fetch failed");
            ApiError::Upstream(message)
        }
    })?;

    if let Some(key) = &cache_key {
        match serde_json::to_string(&value) {
            Ok(serialized) => state.cache.set_item(key, serialized),
            Err(error) => tracing::error!(%error, "failed to serialize content for cache"),
        }
    }
    Ok(value)
}

fn public_cache_header(state: &AppState) -> (header::HeaderName, String) {
    let max_age = state.config.cache.stale_time_secs;
    (
        header::CACHE_CONTROL,
        format!("public, max-age={max_age}, stale-while-revalidate={max_age}"),
    )
}

/// `GET /api/v1/init` — languages for the web client; hands anonymous
/// visitors a site cookie. The site cookie identifies the public client
/// only and never grants editor access.
pub async fn init(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::GET)?;
    let state = &ctx.state;
    let body = serde_json::json!({
        "SUPPORTED_LANGUAGES": SUPPORTED_LANGUAGES,
        "defaultLanguage": DEFAULT_LANGUAGE,
    });
    let headers = ctx.request.headers();
    let covered = has_valid_session(state, headers)
        || session_token(state, headers).is_some_and(|token| state.sessions.is_site(token));
    if covered {
        return response::json(body);
    }
    let secure = state.config.session.secure_cookies;
    let cookie = serialize_cookie(
        session_cookie_name(secure),
        &state.sessions.issue_site(),
        state.sessions.cookie_age(),
        secure,
    );
    response::json_with_headers(body, &[(header::SET_COOKIE, cookie)])
}

/// `GET /api/v1/mobile-init` — languages plus the mobile client key.
pub async fn mobile_init(ctx: RequestContext, _params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::GET)?;
    response::json(serde_json::json!({
        "key": ctx.state.config.keys.mobile_client_key,
        "SUPPORTED_LANGUAGES": SUPPORTED_LANGUAGES,
        "defaultLanguage": DEFAULT_LANGUAGE,
    }))
}

/// `GET /get-cards-set/:language`
pub async fn cards_set(ctx: RequestContext, params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::GET)?;
    let query = ContentQuery::CardsSet {
        language: require(&params, "language")?,
    };
    let data = cached_fetch(&ctx.state, &query).await?;
    response::json_with_headers(data, &[public_cache_header(&ctx.state)])
}

/// `GET /get-card-by-id/:language/:id`
pub async fn card_by_id(ctx: RequestContext, params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::GET)?;
    let query = ContentQuery::CardById {
        language: require(&params, "language")?,
        id: require(&params, "id")?,
    };
    let data = cached_fetch(&ctx.state, &query).await?;
    response::json_with_headers(data, &[public_cache_header(&ctx.state)])
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PickedCard {
    id: String,
    #[allow(dead_code)]
    upside_down: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomCardInput {
    prev_picked_cards: Vec<PickedCard>,
}

const RANDOM_CARD_BODY_LIMIT: usize = 64 * 1024;

/// `POST /get-random-card/:language` — draw a card not in the client's
/// recent picks. Never cached.
pub async fn random_card(ctx: RequestContext, params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::POST)?;
    let language = require(&params, "language")?;
    let state = ctx.state;

    let bytes = axum::body::to_bytes(ctx.request.into_body(), RANDOM_CARD_BODY_LIMIT)
        .await
        .map_err(|_| ApiError::BadRequest("unreadable body".into()))?;
    let input: RandomCardInput = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::BadRequest("invalid random card input".into()))?;

    let query = ContentQuery::random_card(
        language,
        input.prev_picked_cards.into_iter().map(|c| c.id).collect(),
    );
    let data = cached_fetch(&state, &query).await?;
    response::json_with_headers(data, &[(header::CACHE_CONTROL, "no-store".to_string())])
}

/// `GET /get-all-pages/:language`
pub async fn pages(ctx: RequestContext, params: Params) -> Result<Response, ApiError> {
    require_method(&ctx, Method::GET)?;
    let query = ContentQuery::Pages {
        language: require(&params, "language")?,
    };
    let data = cached_fetch(&ctx.state, &query).await?;
    response::json_with_headers(data, &[public_cache_header(&ctx.state)])
}
