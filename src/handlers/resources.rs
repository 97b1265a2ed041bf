// src/handlers/resources.rs

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::handlers::AppState;
use crate::models::{
    CreateResourceRequest, Resource, ResourceEnvelope, ResourceListEnvelope,
    UpdateResourceRequest,
};
use crate::services::AuthUser;

// ==================== 资源相关 ====================

/// POST /resources - 新建资源，返回裸文档
pub async fn create_resource(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateResourceRequest>,
) -> AppResult<Json<Resource>> {
    let resource = state.resources.create(&auth_user.user.id, req).await?;
    Ok(Json(resource))
}

/// GET /resources - 当前用户的资源列表
pub async fn list_resources(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<ResourceListEnvelope>> {
    let resources = state.resources.list(&auth_user.user.id).await?;
    Ok(Json(ResourceListEnvelope { resources }))
}

/// GET /resources/:id
pub async fn get_resource(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ResourceEnvelope>> {
    let resource = state.resources.get_by_id(&auth_user.user.id, &id).await?;
    Ok(Json(ResourceEnvelope { resource }))
}

/// PATCH /resources/:id - 部分更新，完成状态整体重算
pub async fn update_resource(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateResourceRequest>,
) -> AppResult<Json<ResourceEnvelope>> {
    let resource = state
        .resources
        .update(&auth_user.user.id, &id, req)
        .await?;
    Ok(Json(ResourceEnvelope { resource }))
}

/// DELETE /resources/:id - 删除并返回删除前的文档
pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ResourceEnvelope>> {
    let resource = state.resources.remove(&auth_user.user.id, &id).await?;
    Ok(Json(ResourceEnvelope { resource }))
}
