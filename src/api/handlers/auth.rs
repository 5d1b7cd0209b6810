use axum::{
    extract::State,
    http::StatusCode,
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{CreateUserRequest, User, UserRole},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserInfo,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .service_context
        .user_repo
        .find_by_username(&form.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&form.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    if !user.is_active {
        return Err(AppError::BadRequest("Account is disabled".to_string()));
    }

    let access_token = state.service_context.auth_service.issue_token(user.id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub full_name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user_repo = &state.service_context.user_repo;

    if user_repo.find_by_username(&request.username).await?.is_some() {
        return Err(AppError::BadRequest("Username already exists".to_string()));
    }

    if user_repo.find_by_email(&request.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    // New accounts wait for an administrator to activate them.
    user_repo
        .create(CreateUserRequest {
            username: request.username,
            email: request.email,
            password: request.password,
            full_name: request.full_name,
            role: UserRole::User,
            is_active: false,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful, awaiting administrator approval"
        })),
    ))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserInfo> {
    Json(current.user.into())
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email)]
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

pub async fn send_email(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Json(request): Json<EmailRequest>,
) -> Result<Json<serde_json::Value>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let outcome = state
        .service_context
        .mailer
        .send(&request.to_email, &request.subject, &request.body)
        .await?;

    Ok(Json(json!({
        "message": "Mail sent",
        "mock_mode": outcome.mock_mode,
        "to": request.to_email,
        "subject": request.subject,
    })))
}
