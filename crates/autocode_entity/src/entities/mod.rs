pub mod prelude;

pub mod casbin_rule;
pub mod sys_api;
pub mod sys_authority_btn;
pub mod sys_authority_menu;
pub mod sys_auto_code_history;
pub mod sys_base_menu;
pub mod sys_base_menu_btn;
pub mod sys_base_menu_parameter;
pub mod sys_export_template;
