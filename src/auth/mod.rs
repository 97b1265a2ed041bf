// src/auth/mod.rs

pub mod middleware;
pub mod token;

pub use middleware::*;
pub use token::*;
