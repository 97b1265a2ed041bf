// src/services/resource_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateResourceRequest, Resource, UpdateResourceRequest};
use crate::storage::Database;

/// 文章资源服务
///
/// 所有操作都以请求者为 creator 过滤；别人的资源和不存在的资源
/// 表现完全一致。
#[derive(Clone)]
pub struct ResourceService {
    db: Database,
}

impl ResourceService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        creator_id: &str,
        req: CreateResourceRequest,
    ) -> AppResult<Resource> {
        let title = non_empty_trimmed(&req.title, "title")?;
        let body = non_empty_trimmed(&req.body, "body")?;

        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4().to_string(),
            title,
            body,
            completed: false,
            completed_at: None,
            creator_id: creator_id.to_string(),
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };

        self.db.create_resource(&resource).await?;
        Ok(resource)
    }

    /// 列出请求者自己的全部资源，按创建顺序
    pub async fn list(&self, creator_id: &str) -> AppResult<Vec<Resource>> {
        self.db.list_resources_by_creator(creator_id).await
    }

    pub async fn get_by_id(&self, creator_id: &str, id: &str) -> AppResult<Resource> {
        let id = parse_resource_id(id)?;
        self.db
            .get_resource(&id, creator_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// 更新资源，只应用请求里出现的字段
    ///
    /// 完成状态每次整体重算：没带 completed=true 的更新一律回到
    /// 未完成并清掉 completed_at，调用方要保持完成状态就得重发。
    pub async fn update(
        &self,
        creator_id: &str,
        id: &str,
        req: UpdateResourceRequest,
    ) -> AppResult<Resource> {
        let id = parse_resource_id(id)?;

        let mut resource = self
            .db
            .get_resource(&id, creator_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(title) = &req.title {
            resource.title = non_empty_trimmed(title, "title")?;
        }
        if let Some(body) = &req.body {
            resource.body = non_empty_trimmed(body, "body")?;
        }

        if req.completed == Some(true) {
            resource.completed = true;
            resource.completed_at = Some(Utc::now().timestamp_millis());
        } else {
            resource.completed = false;
            resource.completed_at = None;
        }

        resource.updated_at = Utc::now().to_rfc3339();

        let updated = self.db.update_resource(&resource).await?;
        if !updated {
            return Err(AppError::NotFound);
        }
        Ok(resource)
    }

    /// 删除资源并返回删除前的内容
    pub async fn remove(&self, creator_id: &str, id: &str) -> AppResult<Resource> {
        let id = parse_resource_id(id)?;

        let resource = self
            .db
            .get_resource(&id, creator_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let deleted = self.db.delete_resource(&id, creator_id).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(resource)
    }
}

/// 非法 ID 与不存在等价对待，顺便归一成标准 UUID 写法
fn parse_resource_id(id: &str) -> AppResult<String> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound)?;
    Ok(id.to_string())
}

fn non_empty_trimmed(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Field '{}' must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}
