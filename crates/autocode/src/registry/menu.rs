use anyhow::{Context, Result};
use async_trait::async_trait;
use autocode_entity::{
    sys_authority_btn, sys_authority_menu, sys_base_menu, sys_base_menu_btn, sys_base_menu_parameter,
};
use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, DatabaseTransaction, QuerySelect, TransactionTrait};
use tracing::debug;

use super::MenuRegistry;

pub struct DbMenuRegistry {
    db: DatabaseConnection,
}

impl DbMenuRegistry {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// 以 `root` 为根的菜单子树，子菜单排在父菜单之前
async fn subtree(txn: &DatabaseTransaction, root: i32) -> Result<Vec<i32>> {
    let mut ordered = Vec::new();
    let mut frontier = vec![root];
    while !frontier.is_empty() {
        ordered.extend(frontier.iter().copied());
        frontier = sys_base_menu::Entity::find()
            .select_only()
            .column(sys_base_menu::Column::Id)
            .filter(sys_base_menu::Column::ParentId.is_in(frontier.clone()))
            .into_tuple::<i32>()
            .all(txn)
            .await?
            .into_iter()
            .filter(|id| !ordered.contains(id))
            .collect();
    }
    ordered.reverse();
    Ok(ordered)
}

#[async_trait]
impl MenuRegistry for DbMenuRegistry {
    async fn delete_base_menu(&self, id: i32) -> Result<()> {
        let txn = self.db.begin().await?;
        if sys_base_menu::Entity::find_by_id(id).one(&txn).await?.is_none() {
            debug!("菜单 {} 不存在，无需删除", id);
            return Ok(());
        }
        let menus = subtree(&txn, id).await?;
        for &menu in &menus {
            sys_base_menu_parameter::Entity::delete_many()
                .filter(sys_base_menu_parameter::Column::SysBaseMenuId.eq(menu))
                .exec(&txn)
                .await?;
            sys_base_menu_btn::Entity::delete_many()
                .filter(sys_base_menu_btn::Column::SysBaseMenuId.eq(menu))
                .exec(&txn)
                .await?;
            sys_authority_btn::Entity::delete_many()
                .filter(sys_authority_btn::Column::SysMenuId.eq(menu))
                .exec(&txn)
                .await?;
            sys_authority_menu::Entity::delete_many()
                .filter(sys_authority_menu::Column::SysBaseMenuId.eq(menu))
                .exec(&txn)
                .await?;
            sys_base_menu::Entity::delete_by_id(menu).exec(&txn).await?;
        }
        txn.commit()
            .await
            .with_context(|| format!("提交菜单 {id} 删除事务失败"))?;
        debug!("已删除菜单 {} 及其 {} 个子菜单", id, menus.len() - 1);
        Ok(())
    }
}
