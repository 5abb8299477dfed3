use std::collections::BTreeMap;

use autocode_entity::sys_auto_code_history;
use serde::{Deserialize, Serialize};

/// 新建历史记录的参数，由代码生成步骤填写
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryCreate {
    pub table: String,
    pub package: String,
    /// 生成时的原始请求，原样保存
    pub request: String,
    pub struct_name: String,
    pub abbreviation: String,
    #[serde(rename = "businessDB")]
    pub business_db: String,
    pub description: String,
    pub templates: BTreeMap<String, String>,
    pub injections: BTreeMap<String, String>,
    pub api_ids: Vec<i32>,
    #[serde(rename = "menuID")]
    pub menu_id: i32,
    #[serde(rename = "exportTemplateID")]
    pub export_template_id: i32,
}

/// 回滚参数，三个开关分别控制是否删除 API、菜单与数据表
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollbackRequest {
    #[serde(rename = "ID")]
    pub id: i32,
    pub delete_api: bool,
    pub delete_menu: bool,
    pub delete_table: bool,
}

impl RollbackRequest {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self { page: 1, page_size: 10 }
    }
}

impl PageInfo {
    /// 修正后的 (页码, 每页条数)，页码从 1 开始
    pub fn normalized(&self) -> (u64, u64) {
        let page = self.page.max(1);
        let page_size = match self.page_size {
            0 => 10,
            size if size > 100 => 100,
            size => size,
        };
        (page, page_size)
    }
}

/// 代码生成器为每个实体登记的六个接口，返回 (路径, 方法)
///
/// 路由前缀取简称，简称为空时使用表名。
pub fn legacy_api_routes(history: &sys_auto_code_history::Model) -> Vec<(String, String)> {
    let prefix = if history.abbreviation.is_empty() {
        &history.table_name
    } else {
        &history.abbreviation
    };
    let name = &history.struct_name;
    [
        ("POST", format!("create{name}")),
        ("DELETE", format!("delete{name}")),
        ("DELETE", format!("delete{name}ByIds")),
        ("PUT", format!("update{name}")),
        ("GET", format!("find{name}")),
        ("GET", format!("get{name}List")),
    ]
    .into_iter()
    .map(|(method, action)| (format!("/{prefix}/{action}"), method.to_string()))
    .collect()
}
