use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sys_base_menu_btns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sys_base_menu_id: i32,
    pub name: String,
    pub desc: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
