use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::AppState;

pub const ADMIN_USER_HEADER: &str = "x-admin-user";
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Extractor that only succeeds for requests carrying accepted admin
/// credentials in the `X-Admin-User` / `X-Admin-Password` headers.
#[derive(Debug)]
pub struct Admin {
    pub username: String,
}

impl FromRequest for Admin {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn authenticate(req: &HttpRequest) -> Result<Admin, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state missing".into()))?;
    let (Some(username), Some(password)) = (
        header(req, ADMIN_USER_HEADER),
        header(req, ADMIN_PASSWORD_HEADER),
    ) else {
        return Err(AppError::Unauthorized);
    };
    if state.credentials.verify(username, password) {
        Ok(Admin {
            username: username.to_string(),
        })
    } else {
        log::warn!("Rejected admin credentials for '{username}'");
        Err(AppError::Unauthorized)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub authenticated: bool,
}

/// POST /admin/login
///
/// Checks a credential pair. Admin endpoints take the same pair in the
/// `X-Admin-User` / `X-Admin-Password` headers.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Credentials rejected", body = LoginResponse),
    ),
    tag = "admin"
)]
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> HttpResponse {
    let authenticated = state.credentials.verify(&body.username, &body.password);
    if authenticated {
        log::info!("Admin '{}' logged in", body.username);
        HttpResponse::Ok().json(LoginResponse { authenticated })
    } else {
        log::warn!("Failed admin login for '{}'", body.username);
        HttpResponse::Unauthorized().json(LoginResponse { authenticated })
    }
}
