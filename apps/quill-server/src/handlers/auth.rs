//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::Session;
use quill_core::ports::BaseRepository;
use quill_core::validation::{LoginForm, RegistrationForm};
use quill_shared::ApiResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterUserRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn auth_response(state: &AppState, session: Session) -> AuthResponse {
    AuthResponse {
        user: UserResponse {
            id: session.user_id,
            username: session.username(),
            email: session.email,
        },
        access_token: session.access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds(),
        expires_at: session.expires_at,
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .accounts
        .register(RegistrationForm {
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        })
        .await?;

    tracing::info!(user_id = %session.user_id, "User registered");
    Ok(HttpResponse::Created().json(ApiResponse::ok(auth_response(&state, session))))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .accounts
        .login(LoginForm {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(auth_response(&state, session))))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("This account no longer exists".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(UserResponse {
        id: user.id,
        email: user.email,
        username: user.username,
    })))
}
