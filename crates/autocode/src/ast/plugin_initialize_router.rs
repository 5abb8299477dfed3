use serde::{Deserialize, Serialize};

use super::{remove_statement, router_group_args, Ast, GoSource, ListKind};

const FUNC: &str = "Router";

/// 插件 `initialize/router.go` 中的路由注册语句
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginInitializeRouter {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    pub app_name: String,
    pub group_name: String,
    pub package_name: String,
    pub function_name: String,
    pub left_router_group_name: String,
    pub right_router_group_name: String,
}

impl PluginInitializeRouter {
    fn statement(&self) -> String {
        format!(
            "{}.{}.{}.{}({})",
            self.package_name,
            self.app_name,
            self.group_name,
            self.function_name,
            router_group_args(&self.left_router_group_name, &self.right_router_group_name)
        )
    }

    fn locate(file: &GoSource) -> Option<usize> {
        file.find_func(FUNC)
    }
}

impl Ast for PluginInitializeRouter {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        if self.function_name.is_empty() {
            return false;
        }
        let Some(body) = Self::locate(file) else {
            return false;
        };
        let statement = self.statement();
        let exists = file
            .list(body, ListKind::Statements)
            .into_iter()
            .any(|node| file.node_is(node, &statement));
        let mut changed = !exists && file.insert_into_list(body, ListKind::Statements, &statement);
        changed |= file.add_import(&self.import_path);
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        if self.function_name.is_empty() {
            return false;
        }
        let mut changed = remove_statement(file, Self::locate, &self.statement());
        changed |= file.remove_import_if_unused(&self.import_path);
        changed
    }
}
