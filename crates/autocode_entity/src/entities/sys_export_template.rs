use sea_orm::entity::prelude::*;

/// 导出模板，由代码生成器按需创建
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sys_export_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub db_name: String,
    pub name: String,
    pub table_name: String,
    pub template_id: String,
    #[sea_orm(column_type = "Text")]
    pub template_info: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
