// src/cli.rs

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::models::User;
use crate::services::{is_valid_email, normalize_email, MIN_PASSWORD_LEN};
use crate::storage::Database;
use crate::utils::CryptoUtils;

#[derive(Parser)]
#[command(name = "articled")]
#[command(about = "Article REST service and management CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 启动服务 (默认)
    Server,

    /// 用户管理命令
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// 创建新用户
    Create {
        /// 邮箱
        #[arg(short, long)]
        email: String,

        /// 密码
        #[arg(short, long)]
        password: String,
    },

    /// 列出所有用户
    List,

    /// 删除用户（连带会话和资源）
    Delete {
        /// 邮箱
        #[arg(short, long)]
        email: String,
    },

    /// 重置用户密码
    ResetPassword {
        /// 邮箱
        #[arg(short, long)]
        email: String,

        /// 新密码
        #[arg(short, long)]
        password: String,
    },
}

pub struct CliHandler {
    db: Database,
}

impl CliHandler {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn handle_user_command(&self, cmd: UserCommands) -> anyhow::Result<()> {
        match cmd {
            UserCommands::Create { email, password } => {
                let email = normalize_email(&email);
                if !is_valid_email(&email) {
                    println!("错误: 邮箱 '{}' 格式不合法", email);
                    return Ok(());
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    println!("错误: 密码至少需要 {} 个字符", MIN_PASSWORD_LEN);
                    return Ok(());
                }
                if self.db.get_user_by_email(&email).await?.is_some() {
                    println!("错误: 用户 '{}' 已存在", email);
                    return Ok(());
                }

                let password_hash = CryptoUtils::hash_password(&password)?;
                let now = chrono::Utc::now();

                let user = User {
                    id: Uuid::new_v4().to_string(),
                    email: email.clone(),
                    password_hash,
                    created_at: now.to_rfc3339(),
                    updated_at: now.to_rfc3339(),
                };

                self.db.create_user(&user).await?;
                println!("成功: 用户 '{}' 已创建 (ID: {})", email, user.id);
            }
            UserCommands::List => {
                let users = self.db.list_users().await?;
                if users.is_empty() {
                    println!("暂无用户");
                    return Ok(());
                }

                println!("共 {} 个用户:", users.len());
                for user in users {
                    let sessions = self.db.get_user_tokens(&user.id).await?;
                    println!(
                        "  {}  {}  会话数: {}  创建于: {}",
                        user.id,
                        user.email,
                        sessions.len(),
                        user.created_at
                    );
                }
            }
            UserCommands::Delete { email } => {
                let email = normalize_email(&email);
                match self.db.get_user_by_email(&email).await? {
                    Some(user) => {
                        self.db.delete_user(&user.id).await?;
                        println!("成功: 用户 '{}' 已删除 (ID: {})", email, user.id);
                    }
                    None => {
                        println!("错误: 用户 '{}' 不存在", email);
                    }
                }
            }
            UserCommands::ResetPassword { email, password } => {
                let email = normalize_email(&email);
                if password.chars().count() < MIN_PASSWORD_LEN {
                    println!("错误: 密码至少需要 {} 个字符", MIN_PASSWORD_LEN);
                    return Ok(());
                }

                match self.db.get_user_by_email(&email).await? {
                    Some(user) => {
                        let new_hash = CryptoUtils::hash_password(&password)?;
                        let now = chrono::Utc::now().to_rfc3339();
                        self.db
                            .update_user_password(&user.id, &new_hash, &now)
                            .await?;
                        println!("成功: 用户 '{}' 密码已重置", email);
                    }
                    None => {
                        println!("错误: 用户 '{}' 不存在", email);
                    }
                }
            }
        }
        Ok(())
    }
}
