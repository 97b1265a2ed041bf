// src/services/user_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::services::auth_service::{AuthService, AuthUser};
use crate::storage::Database;
use crate::utils::CryptoUtils;

/// 密码最短长度（字符数）
pub const MIN_PASSWORD_LEN: usize = 6;

/// 用户账号服务
///
/// 注册、登录、注销。登录失败不区分“邮箱不存在”和“密码错误”。
#[derive(Clone)]
pub struct UserService {
    db: Database,
    auth: AuthService,
}

impl UserService {
    pub fn new(db: Database, auth: AuthService) -> Self {
        Self { db, auth }
    }

    /// 注册新用户并签发首个会话令牌
    pub async fn signup(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AppError::ValidationError(format!(
                "Invalid email address: {}",
                email
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        // 检查邮箱是否已注册
        if self.db.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::ValidationError(format!(
                "Email already registered: {}",
                email
            )));
        }

        let password_hash = CryptoUtils::hash_password(password)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };

        self.db.create_user(&user).await?;

        let token = self.auth.issue_token(&user.id).await?;
        Ok(AuthUser { user, token })
    }

    /// 凭邮箱加密码登录，成功时签发新的会话令牌
    ///
    /// 新令牌是追加的，已有会话继续有效。
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthUser> {
        let email = normalize_email(email);

        let user = self
            .db
            .get_user_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !CryptoUtils::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.auth.issue_token(&user.id).await?;
        Ok(AuthUser { user, token })
    }

    /// 注销当前会话：只撤销本次出示的令牌
    pub async fn logout(&self, user_id: &str, token: &str) -> AppResult<()> {
        self.auth.revoke_token(user_id, token).await
    }
}

/// 邮箱归一化：去空白、转小写
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 邮箱形状检查：单个 @，本地段非空，域名段带点且不以点开头结尾
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
