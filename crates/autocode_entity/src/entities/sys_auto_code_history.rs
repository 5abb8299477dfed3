use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;

/// 代码生成器历史记录
///
/// `templates`、`injections`、`api_ids` 以 JSON 文本保存，读取时通过对应方法解码。
/// `flag`：0 表示有效，1 表示已回滚。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sys_auto_code_histories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: String,
    pub updated_at: String,
    pub table_name: String,
    pub package: String,
    #[sea_orm(column_type = "Text")]
    pub request: String,
    pub struct_name: String,
    pub abbreviation: String,
    pub business_db: String,
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub templates: String,
    #[sea_orm(column_type = "Text")]
    pub injections: String,
    #[sea_orm(column_type = "Text")]
    pub api_ids: String,
    pub menu_id: i32,
    pub export_template_id: i32,
    pub flag: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub const FLAG_ACTIVE: i32 = 0;
pub const FLAG_ROLLED_BACK: i32 = 1;

impl Model {
    /// 生成的文件：规范相对路径 -> 写入时的绝对路径
    pub fn templates(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        decode_or_default(&self.templates)
    }

    /// 注入记录：注入类型 -> 序列化后的注入描述
    pub fn injections(&self) -> Result<BTreeMap<String, String>, serde_json::Error> {
        decode_or_default(&self.injections)
    }

    /// 生成时登记的 API id，旧记录为空
    pub fn api_ids(&self) -> Result<Vec<i32>, serde_json::Error> {
        decode_or_default(&self.api_ids)
    }

    pub fn is_rolled_back(&self) -> bool {
        self.flag == FLAG_ROLLED_BACK
    }
}

fn decode_or_default<T>(raw: &str) -> Result<T, serde_json::Error>
where
    T: serde::de::DeserializeOwned + Default,
{
    if raw.trim().is_empty() || raw.trim() == "null" {
        return Ok(T::default());
    }
    serde_json::from_str(raw)
}
