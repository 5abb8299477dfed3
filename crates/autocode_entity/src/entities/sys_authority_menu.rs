use sea_orm::entity::prelude::*;

/// 角色与菜单的关联
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sys_authority_menus")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sys_authority_authority_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sys_base_menu_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
