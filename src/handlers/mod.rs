// src/handlers/mod.rs

pub mod health;
pub mod resources;
pub mod users;

pub use health::*;
pub use resources::*;
pub use users::*;

use crate::services::{ResourceService, UserService};
use crate::storage::Database;

// ==================== 应用状态 ====================

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: UserService,
    pub resources: ResourceService,
}
