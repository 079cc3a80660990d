//! Admin authentication: login, logout and the session guard.
//!
//! The session cookie carries `<token>.<signature>`, where the signature is an
//! HMAC-SHA256 of the token under SECRET_KEY. A request is authorized only when
//! the signature checks out and the token's hash is present and unexpired in
//! the `admin_session` table.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;

use crate::core::config::session;
use crate::core::error::AppResult;
use crate::storage::{get_connection, sessions, AdminSession};
use crate::web::render;
use crate::web::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Outcome of checking a request's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted(AdminSession),
    Denied,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn new_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

/// Cookie value for a freshly issued token.
pub fn sign_token(secret: &str, token: &str) -> String {
    let mut mac = new_mac(secret);
    mac.update(token.as_bytes());
    format!("{}.{}", token, hex::encode(mac.finalize().into_bytes()))
}

/// Returns the token if the cookie value carries a valid signature.
pub fn verify_signed_token<'a>(secret: &str, value: &'a str) -> Option<&'a str> {
    let (token, signature) = value.rsplit_once('.')?;
    let signature = hex::decode(signature).ok()?;

    let mut mac = new_mac(secret);
    mac.update(token.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(token)
}

/// Value of the named cookie from the request's Cookie headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn session_cookie(value: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", session::COOKIE_NAME, value)
}

fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", session::COOKIE_NAME)
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

/// Check the request's session against the session store.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Authorization {
    let Some(cookie) = cookie_value(headers, session::COOKIE_NAME) else {
        return Authorization::Denied;
    };
    let Some(token) = verify_signed_token(state.config.secret_key.expose_secret(), cookie) else {
        log::warn!("Rejected session cookie with a bad signature");
        return Authorization::Denied;
    };

    let lookup = get_connection(&state.db)
        .map_err(|e| e.to_string())
        .and_then(|conn| sessions::find_session(&conn, token, Utc::now()).map_err(|e| e.to_string()));

    match lookup {
        Ok(Some(session)) => Authorization::Granted(session),
        Ok(None) => Authorization::Denied,
        Err(e) => {
            log::error!("Session lookup failed: {}", e);
            Authorization::Denied
        }
    }
}

/// Middleware for the protected routes: unauthenticated requests go to /login.
pub async fn require_admin(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authorize(&state, req.headers()) {
        Authorization::Granted(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Authorization::Denied => Redirect::to("/login").into_response(),
    }
}

/// GET /login
pub async fn login_form_handler() -> Html<String> {
    Html(render::login_page(None))
}

/// POST /login
pub async fn login_handler(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let config = &state.config;
    let password = config.admin_password.expose_secret();

    let valid = !password.is_empty() && form.username == config.admin_username && form.password == password;
    if !valid {
        log::warn!("Failed admin login for username '{}'", form.username);
        return Ok(Html(render::login_page(Some("Invalid username or password"))).into_response());
    }

    let token = uuid::Uuid::new_v4().simple().to_string();
    let now = Utc::now();

    let conn = get_connection(&state.db)?;
    let purged = sessions::purge_expired_sessions(&conn, now)?;
    if purged > 0 {
        log::info!("Purged {} expired admin session(s)", purged);
    }
    sessions::create_session(&conn, &token, &form.username, now, now + session::lifetime())?;

    log::info!("Admin '{}' logged in", form.username);

    let cookie = session_cookie(&sign_token(config.secret_key.expose_secret(), &token));
    Ok(with_cookie(Redirect::to("/admin").into_response(), &cookie))
}

/// GET /logout
pub async fn logout_handler(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let token = cookie_value(&headers, session::COOKIE_NAME)
        .and_then(|cookie| verify_signed_token(state.config.secret_key.expose_secret(), cookie));

    if let Some(token) = token {
        let conn = get_connection(&state.db)?;
        if sessions::delete_session(&conn, token)? {
            log::info!("Admin logged out");
        }
    }

    Ok(with_cookie(Redirect::to("/login").into_response(), &expired_session_cookie()))
}
