use anyhow::{Context, Result};
use async_trait::async_trait;
use autocode_entity::{casbin_rule, sys_api};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::debug;

use super::ApiRegistry;

pub struct DbApiRegistry {
    db: DatabaseConnection,
}

impl DbApiRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ApiRegistry for DbApiRegistry {
    async fn find_api_ids(&self, routes: &[(String, String)]) -> Result<Vec<i32>> {
        let mut ids = Vec::with_capacity(routes.len());
        for (path, method) in routes {
            let found = sys_api::Entity::find()
                .filter(sys_api::Column::Path.eq(path.as_str()))
                .filter(sys_api::Column::Method.eq(method.as_str()))
                .one(&self.db)
                .await
                .with_context(|| format!("查询 API {method} {path} 失败"))?;
            if let Some(api) = found {
                ids.push(api.id);
            }
        }
        Ok(ids)
    }

    async fn delete_apis_by_ids(&self, ids: &[i32]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let txn = self.db.begin().await?;
        let apis = sys_api::Entity::find()
            .filter(sys_api::Column::Id.is_in(ids.iter().copied()))
            .all(&txn)
            .await?;
        for api in &apis {
            let cleared = casbin_rule::Entity::delete_many()
                .filter(casbin_rule::Column::V1.eq(api.path.as_str()))
                .filter(casbin_rule::Column::V2.eq(api.method.as_str()))
                .exec(&txn)
                .await?;
            debug!("已清除 {} {} 的 {} 条权限规则", api.method, api.path, cleared.rows_affected);
        }
        sys_api::Entity::delete_many()
            .filter(sys_api::Column::Id.is_in(ids.iter().copied()))
            .exec(&txn)
            .await?;
        txn.commit().await.context("提交 API 删除事务失败")?;
        debug!("已删除 {} 个 API", apis.len());
        Ok(())
    }
}
