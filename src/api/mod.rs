//! HTTP boundary for the authentication core
//!
//! Only the login endpoint and a couple of session conveniences live here;
//! the clinical CRUD surface is a separate collaborator that composes
//! [`RoleGate`](crate::gate::RoleGate)s around its own handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::AuthenticationService;
use crate::config::TokenTransport;
use crate::error::{Error, Result};
use crate::session::SessionResolver;
use crate::types::{LoginForm, TokenResponse};

#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthenticationService>,
    pub resolver: SessionResolver,
    /// How issued tokens are delivered back to the client.
    pub transport: TokenTransport,
}

/// Build the router for the authentication endpoints.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/token", post(login))
        .route("/me", get(me))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// OAuth2 password-grant login. The token always travels in the response
/// body; under the cookie transport it is additionally set as an http-only
/// cookie so browser sessions need no script-side token handling.
async fn login(
    State(state): State<ApiState>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let issued = state.auth.login(&form.username, &form.password).await?;

    let body = TokenResponse {
        access_token: issued.access_token.clone(),
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
    };
    let mut response = Json(body).into_response();

    if let TokenTransport::Cookie { name } = &state.transport {
        let cookie = format!(
            "{name}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            issued.access_token, issued.expires_in
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| Error::Config(format!("invalid session cookie: {e}")))?;
        response.headers_mut().insert(header::SET_COOKIE, value);
    }

    Ok(response)
}

/// Return the authenticated principal for the presented token.
async fn me(State(state): State<ApiState>, headers: HeaderMap) -> Result<Response> {
    let principal = state.resolver.resolve(&headers).await?;
    Ok(Json(principal).into_response())
}
