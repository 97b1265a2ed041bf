// src/services/auth_service.rs

use chrono::Utc;
use std::sync::Arc;

use crate::auth::token::{TokenSigner, AUTH_ACCESS};
use crate::error::{AppError, AppResult};
use crate::models::{User, UserToken};
use crate::storage::Database;

/// 一次已通过认证的请求身份：用户本人加上本次出示的令牌
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// 令牌生命周期服务
///
/// 签发、验证、撤销。会话表是最终裁决：签名再有效，
/// 表里没有这条令牌就是未认证。
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    signer: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(db: Database, signer: Arc<TokenSigner>) -> Self {
        Self { db, signer }
    }

    /// 签发令牌并登记为用户的一个会话
    pub async fn issue_token(&self, user_id: &str) -> AppResult<String> {
        let token = self.signer.sign(user_id)?;

        let row = UserToken {
            user_id: user_id.to_string(),
            access: AUTH_ACCESS.to_string(),
            token: token.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.db.add_token(&row).await?;

        Ok(token)
    }

    /// 验证令牌并解析出请求身份
    ///
    /// 验签之后还要求会话表里确实有这条令牌，且归属与 sub 一致；
    /// 任何失败（包括存储故障）对调用方都只是未认证。
    pub async fn verify_token(&self, token: &str) -> AppResult<AuthUser> {
        let claims = self.signer.verify(token)?;

        let user = self
            .db
            .find_user_by_token(token, AUTH_ACCESS)
            .await
            .map_err(|_| AppError::Unauthorized)?
            .ok_or(AppError::Unauthorized)?;

        if user.id != claims.sub {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }

    /// 撤销一个会话令牌，重复撤销不算错误
    pub async fn revoke_token(&self, user_id: &str, token: &str) -> AppResult<()> {
        self.db.remove_token(user_id, token).await
    }
}
