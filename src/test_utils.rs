// src/test_utils.rs

//! 测试辅助工具
//!
//! 提供临时数据库和常用夹具

#![cfg(test)]

use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use crate::auth::TokenSigner;
use crate::config::{AuthConfig, Config, DatabaseConfig};
use crate::models::User;
use crate::services::{AuthService, ResourceService, UserService};
use crate::storage::Database;
use crate::utils::CryptoUtils;

/// 测试环境
pub struct TestEnv {
    pub db: Database,
    pub auth: AuthService,
    pub users: UserService,
    pub resources: ResourceService,
    _temp_dir: TempDir, // 保持 TempDir 存活
}

impl TestEnv {
    /// 创建新的测试环境
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = Arc::new(Config {
            database: DatabaseConfig {
                path: db_path.to_string_lossy().to_string(),
                max_connections: 1,
            },
            auth: AuthConfig {
                token_secret: "test-secret-key-for-testing".to_string(),
                token_expiry_hours: 24,
            },
            ..Config::default()
        });

        let db = Database::new(&config.database).await.unwrap();
        db.run_migrations().await.unwrap();

        let signer = Arc::new(TokenSigner::new(&config.auth));
        let auth = AuthService::new(db.clone(), signer);
        let users = UserService::new(db.clone(), auth.clone());
        let resources = ResourceService::new(db.clone());

        Self {
            db,
            auth,
            users,
            resources,
            _temp_dir: temp_dir,
        }
    }
}

/// 创建临时数据库，TempDir 随返回值一起存活
pub async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config = DatabaseConfig {
        path: db_path.to_string_lossy().to_string(),
        max_connections: 1,
    };

    let db = Database::new(&config).await.unwrap();
    db.run_migrations().await.unwrap();

    (db, temp_dir)
}

pub fn create_test_signer() -> TokenSigner {
    let config = AuthConfig {
        token_secret: "test-secret-key-for-testing".to_string(),
        token_expiry_hours: 24,
    };
    TokenSigner::new(&config)
}

/// 直接插入一个测试用户
pub async fn insert_test_user(db: &Database, email: &str) -> User {
    let password_hash = CryptoUtils::hash_password("password123").unwrap();
    let now = chrono::Utc::now();

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        password_hash,
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
    };

    db.create_user(&user).await.unwrap();
    user
}
