//! 代码生成器历史记录
//!
//! 回滚按固定顺序执行：导出模板、API、菜单、数据表 → 注入代码 → 生成文件 → 记录状态 → 语言包。
//! 没有跨存储的事务，某一步失败时立即返回，已经完成的步骤不会撤销；
//! 每一步都能处理“已经撤销过”的情况，修复环境问题后可以直接再次回滚。

mod cleanup;
pub mod i18n;
mod injections;
pub mod paths;
pub mod quarantine;
mod request;

use std::path::PathBuf;
use std::sync::Arc;

use autocode_entity::sys_auto_code_history::{self, FLAG_ACTIVE, FLAG_ROLLED_BACK};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, PaginatorTrait, QueryOrder, Set};
use serde::Serialize;
use tracing::{debug, info};

pub use injections::{reverse_injections, ReverseOutcome};
pub use request::{legacy_api_routes, HistoryCreate, PageInfo, RollbackRequest};

use crate::config::AutoCodeConfig;
use crate::database::DbRegistry;
use crate::error::{AutoCodeError, Result};
use crate::registry::{ApiRegistry, DbApiRegistry, DbMenuRegistry, MenuRegistry};
use crate::utils::time_format::{now_nanos_string, now_standard_string};

/// 一次回滚的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct RollbackReport {
    /// 本次使用的回收站目录
    pub trash_dir: PathBuf,
    /// 移入回收站后的文件路径
    pub moved: Vec<PathBuf>,
    pub injections_reverted: usize,
    pub injections_skipped: usize,
    pub locale_files_rewritten: usize,
}

pub struct AutoCodeHistoryService {
    db: DatabaseConnection,
    config: AutoCodeConfig,
    databases: DbRegistry,
    apis: Arc<dyn ApiRegistry>,
    menus: Arc<dyn MenuRegistry>,
}

impl AutoCodeHistoryService {
    /// 历史记录保存在默认数据库中，API 与菜单使用默认数据库中的登记表
    pub fn new(config: AutoCodeConfig, databases: DbRegistry) -> Self {
        let db = databases.default_db().clone();
        Self {
            apis: Arc::new(DbApiRegistry::new(db.clone())),
            menus: Arc::new(DbMenuRegistry::new(db.clone())),
            db,
            config,
            databases,
        }
    }

    pub fn with_registries(mut self, apis: Arc<dyn ApiRegistry>, menus: Arc<dyn MenuRegistry>) -> Self {
        self.apis = apis;
        self.menus = menus;
        self
    }

    pub fn config(&self) -> &AutoCodeConfig {
        &self.config
    }

    /// 创建代码生成器历史记录
    pub async fn create(&self, info: HistoryCreate) -> Result<sys_auto_code_history::Model> {
        let now = now_standard_string();
        let model = sys_auto_code_history::ActiveModel {
            created_at: Set(now.clone()),
            updated_at: Set(now),
            table_name: Set(info.table),
            package: Set(info.package),
            request: Set(info.request),
            struct_name: Set(info.struct_name),
            abbreviation: Set(info.abbreviation),
            business_db: Set(info.business_db),
            description: Set(info.description),
            templates: Set(serde_json::to_string(&info.templates)?),
            injections: Set(serde_json::to_string(&info.injections)?),
            api_ids: Set(serde_json::to_string(&info.api_ids)?),
            menu_id: Set(info.menu_id),
            export_template_id: Set(info.export_template_id),
            flag: Set(FLAG_ACTIVE),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        debug!("创建历史记录 {}: {}.{}", model.id, model.package, model.struct_name);
        Ok(model)
    }

    async fn find(&self, id: i32) -> Result<sys_auto_code_history::Model> {
        sys_auto_code_history::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AutoCodeError::NotFound(id))
    }

    /// 获取生成时的原始请求
    pub async fn first(&self, id: i32) -> Result<String> {
        Ok(self.find(id).await?.request)
    }

    /// 同一业务库下是否已存在未回滚的同名实体
    pub async fn repeat(&self, business_db: &str, struct_name: &str, package: &str) -> Result<bool> {
        let count = sys_auto_code_history::Entity::find()
            .filter(sys_auto_code_history::Column::BusinessDb.eq(business_db))
            .filter(sys_auto_code_history::Column::StructName.eq(struct_name))
            .filter(sys_auto_code_history::Column::Package.eq(package))
            .filter(sys_auto_code_history::Column::Flag.eq(FLAG_ACTIVE))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// 同一业务库的同一个包下是否还有其他未回滚的记录
    async fn package_in_use(&self, history: &sys_auto_code_history::Model) -> Result<bool> {
        let count = sys_auto_code_history::Entity::find()
            .filter(sys_auto_code_history::Column::BusinessDb.eq(history.business_db.as_str()))
            .filter(sys_auto_code_history::Column::Package.eq(history.package.as_str()))
            .filter(sys_auto_code_history::Column::Flag.eq(FLAG_ACTIVE))
            .filter(sys_auto_code_history::Column::Id.ne(history.id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// 删除历史记录，不执行任何回滚
    pub async fn delete(&self, id: i32) -> Result<()> {
        let result = sys_auto_code_history::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        debug!("删除历史记录 {}，影响 {} 行", id, result.rows_affected);
        Ok(())
    }

    /// 分页获取历史记录，最近更新的在前
    pub async fn get_list(&self, info: PageInfo) -> Result<(Vec<sys_auto_code_history::Model>, u64)> {
        let (page, page_size) = info.normalized();
        let paginator = sys_auto_code_history::Entity::find()
            .order_by_desc(sys_auto_code_history::Column::UpdatedAt)
            .order_by_desc(sys_auto_code_history::Column::Id)
            .paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page - 1).await?;
        Ok((records, total))
    }

    /// 回滚一次代码生成
    pub async fn rollback(&self, request: RollbackRequest) -> Result<RollbackReport> {
        let history = self.find(request.id).await?;
        if history.is_rolled_back() {
            info!("历史记录 {} 已回滚过，重新检查残留内容", history.id);
        }

        if history.export_template_id != 0 {
            cleanup::delete_export_template(&self.db, history.export_template_id).await?;
        }
        if request.delete_api {
            cleanup::delete_apis(self.apis.as_ref(), &history).await;
        }
        if request.delete_menu {
            if history.menu_id != 0 {
                self.menus
                    .delete_base_menu(history.menu_id)
                    .await
                    .map_err(|e| AutoCodeError::registration(format!("delete menu {}", history.menu_id), e))?;
            } else {
                debug!("历史记录 {} 没有关联菜单", history.id);
            }
        }
        if request.delete_table {
            cleanup::drop_table(&self.databases, &history.business_db, &history.table_name).await?;
        }

        let templates = paths::resolve_templates(&self.config, &history.templates()?);
        let package_shared = self.package_in_use(&history).await?;
        let reversed = reverse_injections(&self.config, &history.injections()?, package_shared).await?;

        let timestamp = now_nanos_string();
        let moved = quarantine::quarantine(&self.config, templates.values(), &timestamp).await?;

        if !history.is_rolled_back() {
            let mut active = history.clone().into_active_model();
            active.flag = Set(FLAG_ROLLED_BACK);
            active.updated_at = Set(now_standard_string());
            active.update(&self.db).await.map_err(AutoCodeError::LedgerUpdate)?;
        }

        let mut server_keys = Vec::new();
        if request.delete_menu {
            server_keys.extend(i18n::menu_keys(&history.package, &history.struct_name));
        }
        if request.delete_api {
            server_keys.extend(i18n::api_keys(&history.package, &history.struct_name));
        }
        let mut locale_files_rewritten = 0;
        if !server_keys.is_empty() {
            let files = i18n::json_files(&self.config.server_lang_dir()).await?;
            locale_files_rewritten += i18n::prune(&files, &server_keys).await?;
        }
        let files = i18n::json_files(&self.config.web_locales_dir()).await?;
        locale_files_rewritten +=
            i18n::prune(&files, &i18n::web_keys(&history.package, &history.struct_name)).await?;

        let report = RollbackReport {
            trash_dir: self.config.trash_root(&timestamp),
            moved,
            injections_reverted: reversed.reverted,
            injections_skipped: reversed.skipped,
            locale_files_rewritten,
        };
        info!(
            "历史记录 {} 回滚完成: 移动 {} 个文件，回滚 {} 处注入，清理 {} 个语言包",
            history.id,
            report.moved.len(),
            report.injections_reverted,
            report.locale_files_rewritten
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
