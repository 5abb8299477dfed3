use serde::{Deserialize, Serialize};

use super::{remove_statement, router_group_args, Ast, GoSource, ListKind};

const FUNC: &str = "initBizRouter";

/// `initialize/router_biz.go` 中的路由初始化
///
/// 每个路由分组占用 `initBizRouter` 里的一个独立代码块：
///
/// ```go
/// {
///     exampleRouter := router.RouterGroupApp.Example
///     exampleRouter.InitCustomerRouter(privateGroup, publicGroup)
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageInitializeRouter {
    pub path: String,
    pub relative_path: String,
    pub import_path: String,
    pub app_name: String,
    pub group_name: String,
    pub module_name: String,
    pub package_name: String,
    pub function_name: String,
    pub left_router_group_name: String,
    pub right_router_group_name: String,
}

impl PackageInitializeRouter {
    fn assignment(&self) -> String {
        format!(
            "{} := {}.{}.{}",
            self.module_name, self.package_name, self.app_name, self.group_name
        )
    }

    fn call(&self) -> String {
        format!(
            "{}.{}({})",
            self.module_name,
            self.function_name,
            router_group_args(&self.left_router_group_name, &self.right_router_group_name)
        )
    }

    /// 以分组变量赋值开头的代码块
    fn find_block(&self, file: &GoSource) -> Option<usize> {
        let body = file.find_func(FUNC)?;
        let assignment = self.assignment();
        file.list(body, ListKind::Statements)
            .into_iter()
            .filter_map(|node| file.node_block(node))
            .find(|&open| {
                file.list(open, ListKind::Statements)
                    .first()
                    .is_some_and(|&first| file.node_is(first, &assignment))
            })
    }

    /// 只剩下分组变量赋值的代码块一并删除
    fn remove_empty_block(&self, file: &mut GoSource) -> bool {
        let Some(open) = self.find_block(file) else {
            return false;
        };
        if file.list(open, ListKind::Statements).len() != 1 {
            return false;
        }
        let Some(body) = file.find_func(FUNC) else {
            return false;
        };
        match file
            .list(body, ListKind::Statements)
            .into_iter()
            .find(|&node| file.node_block(node) == Some(open))
        {
            Some(node) => file.remove_node(node, ListKind::Statements, false),
            None => false,
        }
    }
}

impl Ast for PackageInitializeRouter {
    fn path(&self) -> &str {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative_path
    }

    fn inject(&self, file: &mut GoSource) -> bool {
        if self.module_name.is_empty() || self.function_name.is_empty() {
            return false;
        }
        let call = self.call();
        let mut changed = match self.find_block(file) {
            Some(open) => {
                let exists = file
                    .list(open, ListKind::Statements)
                    .into_iter()
                    .any(|node| file.node_is(node, &call));
                !exists && file.insert_into_list(open, ListKind::Statements, &call)
            }
            None => match file.find_func(FUNC) {
                Some(body) => {
                    let block = format!("{{\n\t{}\n\t{}\n}}", self.assignment(), call);
                    file.insert_into_list(body, ListKind::Statements, &block)
                }
                None => return false,
            },
        };
        changed |= file.add_import(&self.import_path);
        changed
    }

    fn rollback(&self, file: &mut GoSource) -> bool {
        if self.module_name.is_empty() || self.function_name.is_empty() {
            return false;
        }
        let mut changed = remove_statement(file, |f| self.find_block(f), &self.call());
        changed |= self.remove_empty_block(file);
        changed |= file.remove_import_if_unused(&self.import_path);
        changed
    }
}
