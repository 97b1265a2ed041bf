// src/models/mod.rs

pub mod resource;
pub mod user;

pub use resource::*;
pub use user::*;
