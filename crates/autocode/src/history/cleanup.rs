use autocode_entity::{sys_auto_code_history, sys_export_template};
use sea_orm::sea_query::{Alias, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait};
use tracing::{debug, error, warn};

use super::request::legacy_api_routes;
use crate::database::DbRegistry;
use crate::error::{AutoCodeError, Result};
use crate::registry::ApiRegistry;

/// 删除代码生成时创建的导出模板
pub async fn delete_export_template(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = sys_export_template::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| AutoCodeError::registration(format!("delete export template {id}"), e))?;
    debug!("删除导出模板 {}，影响 {} 行", id, result.rows_affected);
    Ok(())
}

/// 删除与实体相关的 API
///
/// 优先使用记录中保存的 id，旧记录按生成时的命名规则重新查找。
/// 这一步的失败只记录日志，API 可能早已被手动删除。
pub async fn delete_apis(apis: &dyn ApiRegistry, history: &sys_auto_code_history::Model) {
    let stored = history.api_ids().unwrap_or_else(|e| {
        warn!("历史记录 {} 的 api_ids 无法解析，按命名规则查找: {}", history.id, e);
        Vec::new()
    });
    let ids = if stored.is_empty() {
        match apis.find_api_ids(&legacy_api_routes(history)).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("查找历史记录 {} 的 API 失败: {:#}", history.id, e);
                return;
            }
        }
    } else {
        stored
    };
    if ids.is_empty() {
        debug!("历史记录 {} 没有需要删除的 API", history.id);
        return;
    }
    if let Err(e) = apis.delete_apis_by_ids(&ids).await {
        error!("删除 API {:?} 失败: {:#}", ids, e);
    }
}

/// 在业务库（为空时为默认库）中删除生成的数据表
pub async fn drop_table(databases: &DbRegistry, business_db: &str, table: &str) -> Result<()> {
    if table.is_empty() {
        warn!("历史记录中没有表名，跳过删除数据表");
        return Ok(());
    }
    let db = databases.resolve(business_db)?;
    let statement = Table::drop().table(Alias::new(table)).if_exists().to_owned();
    db.execute(db.get_database_backend().build(&statement))
        .await
        .map_err(|e| AutoCodeError::registration(format!("drop table {table}"), e))?;
    debug!("已删除数据表 {}", table);
    Ok(())
}
