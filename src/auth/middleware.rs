// src/auth/middleware.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AppResult};
use crate::services::AuthService;

/// 承载令牌的请求头，响应签发令牌时也用它
pub const AUTH_HEADER: &str = "x-auth";

/// 认证中间件 - 提取并验证 x-auth 令牌
///
/// 受保护路由的唯一入口，验证通过后把请求身份放进 extensions。
pub async fn auth_middleware(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)?;
    let auth_user = auth.verify_token(&token).await?;

    // 将身份存入 request extensions
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// 从请求中提取令牌
fn extract_token(request: &Request) -> AppResult<String> {
    let header = request
        .headers()
        .get(AUTH_HEADER)
        .ok_or(AppError::Unauthorized)?;

    let token = header.to_str().map_err(|_| AppError::Unauthorized)?;
    Ok(token.to_string())
}
