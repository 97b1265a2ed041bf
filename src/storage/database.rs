// src/storage/database.rs

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use tokio::fs;

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        // 确保数据库目录存在
        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::InternalError(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        // 创建连接池
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&format!("sqlite:{}?mode=rwc", config.path))
            .await
            .map_err(AppError::DatabaseError)?;

        // 启用 WAL 模式和外键约束
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA foreign_keys=ON")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> AppResult<()> {
        // 创建表结构
        self.create_tables().await?;
        Ok(())
    }

    async fn create_tables(&self) -> AppResult<()> {
        // Users 表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 会话令牌表，一行一个会话，rowid 保持签发顺序
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_tokens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                access TEXT NOT NULL,
                token TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Resources 表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS resources (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                completed_at INTEGER,
                creator_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (creator_id) REFERENCES users(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // 创建索引
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_tokens_token ON user_tokens(token)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_resources_creator ON resources(creator_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// 存活检查，供 /ready 使用
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== 用户相关 ====================

    pub async fn create_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn update_user_password(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(updated_at)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user(&self, user_id: &str) -> AppResult<bool> {
        // 依赖外键 CASCADE 删除令牌和资源
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== 令牌相关 ====================

    pub async fn add_token(&self, token: &UserToken) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, access, token, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token.user_id)
        .bind(&token.access)
        .bind(&token.token)
        .bind(&token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 按令牌反查持有它的用户
    ///
    /// 撤销即删行，这里查不到就代表令牌已失效。
    pub async fn find_user_by_token(&self, token: &str, access: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN user_tokens t ON t.user_id = u.id
            WHERE t.token = ? AND t.access = ?
            "#,
        )
        .bind(token)
        .bind(access)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_user_tokens(&self, user_id: &str) -> AppResult<Vec<UserToken>> {
        let tokens = sqlx::query_as::<_, UserToken>(
            "SELECT user_id, access, token, created_at FROM user_tokens WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tokens)
    }

    /// 删除一个会话令牌，令牌不存在时也算成功
    pub async fn remove_token(&self, user_id: &str, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = ? AND token = ?")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== 资源相关 ====================

    pub async fn create_resource(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resources (id, title, body, completed, completed_at, creator_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&resource.id)
        .bind(&resource.title)
        .bind(&resource.body)
        .bind(resource.completed)
        .bind(resource.completed_at)
        .bind(&resource.creator_id)
        .bind(&resource.created_at)
        .bind(&resource.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_resources_by_creator(&self, creator_id: &str) -> AppResult<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE creator_id = ? ORDER BY rowid",
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    pub async fn get_resource(&self, id: &str, creator_id: &str) -> AppResult<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE id = ? AND creator_id = ?",
        )
        .bind(id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(resource)
    }

    pub async fn update_resource(&self, resource: &Resource) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE resources
            SET title = ?, body = ?, completed = ?, completed_at = ?, updated_at = ?
            WHERE id = ? AND creator_id = ?
            "#,
        )
        .bind(&resource.title)
        .bind(&resource.body)
        .bind(resource.completed)
        .bind(resource.completed_at)
        .bind(&resource.updated_at)
        .bind(&resource.id)
        .bind(&resource.creator_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_resource(&self, id: &str, creator_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE id = ? AND creator_id = ?")
            .bind(id)
            .bind(creator_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
