// src/models/resource.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 文章资源
///
/// 对外 JSON 使用 camelCase，归属字段沿用线上格式的 `_creator`；
/// `completed_at` 是毫秒时间戳，仅在标记完成时有值。
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub body: String,
    pub completed: bool,
    pub completed_at: Option<i64>,
    #[serde(rename = "_creator")]
    pub creator_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateResourceRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ResourceEnvelope {
    pub resource: Resource,
}

#[derive(Debug, Serialize)]
pub struct ResourceListEnvelope {
    pub resources: Vec<Resource>,
}
