// src/storage/mod.rs

pub mod database;

pub use database::*;
