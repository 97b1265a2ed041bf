// src/handlers/users.rs

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::auth::AUTH_HEADER;
use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::handlers::AppState;
use crate::models::{CreateUserRequest, LoginRequest, UserResponse};
use crate::services::AuthUser;

// ==================== 账号相关 ====================

/// POST /users - 注册，响应头携带新签发的令牌
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AppResult<Response> {
    let auth_user = state.users.signup(&req.email, &req.password).await?;
    authenticated_response(auth_user)
}

/// POST /users/login - 登录，成功追加一个新会话
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let auth_user = state.users.login(&req.email, &req.password).await?;
    authenticated_response(auth_user)
}

/// GET /users/me - 当前用户的公开信息
pub async fn me(Extension(auth_user): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse::from(auth_user.user))
}

/// DELETE /users/me/token - 注销当前会话
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<StatusCode> {
    state
        .users
        .logout(&auth_user.user.id, &auth_user.token)
        .await?;
    Ok(StatusCode::OK)
}

/// 用户 JSON 加 x-auth 响应头
fn authenticated_response(auth_user: AuthUser) -> AppResult<Response> {
    let token = HeaderValue::from_str(&auth_user.token)
        .map_err(|_| AppError::InternalError("Token is not a valid header value".to_string()))?;

    let mut response = Json(UserResponse::from(auth_user.user)).into_response();
    response.headers_mut().insert(AUTH_HEADER, token);
    Ok(response)
}
