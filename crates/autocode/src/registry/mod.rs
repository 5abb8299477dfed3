//! 回滚时调用的 API / 菜单登记服务
//!
//! 回滚流程只依赖这里的 trait，默认实现直接操作同一个数据库中的登记表。

mod api;
mod menu;

use anyhow::Result;
use async_trait::async_trait;

pub use api::DbApiRegistry;
pub use menu::DbMenuRegistry;

#[async_trait]
pub trait ApiRegistry: Send + Sync {
    /// 按 (路径, 方法) 查找已登记的 API id，找不到的路由直接忽略
    async fn find_api_ids(&self, routes: &[(String, String)]) -> Result<Vec<i32>>;

    /// 删除 API 及其权限规则，空列表不做任何操作
    async fn delete_apis_by_ids(&self, ids: &[i32]) -> Result<()>;
}

#[async_trait]
pub trait MenuRegistry: Send + Sync {
    /// 删除菜单及其全部子菜单，菜单不存在时不做任何操作
    async fn delete_base_menu(&self, id: i32) -> Result<()>;
}
