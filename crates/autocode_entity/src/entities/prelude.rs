pub use super::casbin_rule::Entity as CasbinRule;
pub use super::sys_api::Entity as SysApi;
pub use super::sys_authority_btn::Entity as SysAuthorityBtn;
pub use super::sys_authority_menu::Entity as SysAuthorityMenu;
pub use super::sys_auto_code_history::Entity as SysAutoCodeHistory;
pub use super::sys_base_menu::Entity as SysBaseMenu;
pub use super::sys_base_menu_btn::Entity as SysBaseMenuBtn;
pub use super::sys_base_menu_parameter::Entity as SysBaseMenuParameter;
pub use super::sys_export_template::Entity as SysExportTemplate;
