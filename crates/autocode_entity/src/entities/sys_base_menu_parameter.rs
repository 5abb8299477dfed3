use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sys_base_menu_parameters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sys_base_menu_id: i32,
    pub r#type: String,
    pub key: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
