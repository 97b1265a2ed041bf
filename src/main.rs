// src/main.rs

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use articled::cli::{Cli, CliHandler, Commands};
use articled::config::Config;
use articled::server::Server;
use articled::storage::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "articled=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        Arc::new(Config::default())
    });

    tracing::info!("Starting articled v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Server configuration: {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!("Database path: {}", config.database.path);

    // 初始化数据库
    let db = Database::new(&config.database).await?;
    db.run_migrations().await?;

    // 解析命令行参数并分发
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::User(user_cmd)) => {
            let handler = CliHandler::new(db);
            handler.handle_user_command(user_cmd).await?;
        }
        Some(Commands::Server) | None => {
            let server = Server::new(config, db).await?;
            server.run().await?;
        }
    }

    Ok(())
}
