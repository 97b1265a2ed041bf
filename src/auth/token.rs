// src/auth/token.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// 会话令牌的用途标记
pub const AUTH_ACCESS: &str = "auth";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub access: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// 令牌签发与验签
///
/// 只负责密码学部分；令牌是否仍然有效由会话表说了算。
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            expiry_hours: config.token_expiry_hours,
        }
    }

    /// 为用户签发一个会话令牌
    ///
    /// jti 随机，同一秒内重复签发也不会产生相同的令牌串。
    pub fn sign(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            access: AUTH_ACCESS.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign token: {}", e)))
    }

    /// 验签并检查用途，任何问题都归结为未认证
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;

        if data.claims.access != AUTH_ACCESS {
            return Err(AppError::Unauthorized);
        }

        Ok(data.claims)
    }
}
