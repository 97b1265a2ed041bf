// src/server.rs

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{auth_middleware, TokenSigner};
use crate::config::Config;
use crate::error::AppResult;
use crate::handlers::{health, resources, users, AppState};
use crate::services::{AuthService, ResourceService, UserService};
use crate::storage::Database;

/// 文章服务
pub struct Server {
    config: Arc<Config>,
    router: Router,
}

impl Server {
    pub async fn new(config: Arc<Config>, db: Database) -> AppResult<Self> {
        tracing::info!("Initializing articled v{}", env!("CARGO_PKG_VERSION"));

        let signer = Arc::new(TokenSigner::new(&config.auth));
        let auth_service = AuthService::new(db.clone(), signer);
        let user_service = UserService::new(db.clone(), auth_service.clone());
        let resource_service = ResourceService::new(db.clone());

        let app_state = AppState {
            db,
            users: user_service,
            resources: resource_service,
        };

        let router = Self::build_router(app_state, auth_service);

        Ok(Self { config, router })
    }

    fn build_router(app_state: AppState, auth_service: AuthService) -> Router {
        // 需要认证的路由
        let protected = Router::new()
            .route("/users/me", get(users::me))
            .route("/users/me/token", delete(users::logout))
            .route(
                "/resources",
                post(resources::create_resource).get(resources::list_resources),
            )
            .route(
                "/resources/:id",
                get(resources::get_resource)
                    .patch(resources::update_resource)
                    .delete(resources::delete_resource),
            )
            .layer(middleware::from_fn_with_state(
                auth_service,
                auth_middleware,
            ));

        Router::new()
            // 健康检查（无需认证）
            .route("/health", get(health::health_check))
            .route("/ready", get(health::ready_check))
            // 注册与登录（无需认证）
            .route("/users", post(users::signup))
            .route("/users/login", post(users::login))
            .merge(protected)
            .with_state(app_state)
            // 全局中间件
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .expose_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
    }

    /// 启动服务器
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// 获取路由（用于测试）
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
