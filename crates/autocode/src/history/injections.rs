use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::ast::{self, Ast, Injection, InjectionKind};
use crate::config::AutoCodeConfig;
use crate::error::Result;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReverseOutcome {
    /// 实际被修改并写回的文件数
    pub reverted: usize,
    /// 类型未知、描述无法解析、目标文件缺失或无法解析而跳过的注入数
    pub skipped: usize,
}

/// 逐条回滚注入记录
///
/// `package_shared` 为真时同一个包下还有其他有效的生成记录，包级入口的分组字段保留不动。
/// 只有写回文件失败会中止并返回错误，其余情况都记录日志后继续。
pub async fn reverse_injections(
    config: &AutoCodeConfig,
    injections: &BTreeMap<String, String>,
    package_shared: bool,
) -> Result<ReverseOutcome> {
    let mut outcome = ReverseOutcome::default();
    for (tag, raw) in injections {
        let Ok(kind) = InjectionKind::from_str(tag) else {
            debug!("未知的注入类型 {}，跳过", tag);
            outcome.skipped += 1;
            continue;
        };
        if package_shared && kind.is_package_enter() {
            info!("包内仍有其他有效的生成记录，保留包级入口 {}", tag);
            outcome.skipped += 1;
            continue;
        }
        let injection = match Injection::decode(kind, raw) {
            Ok(injection) => injection,
            Err(e) => {
                warn!("注入描述 {} 无法解析，跳过: {}", tag, e);
                outcome.skipped += 1;
                continue;
            }
        };
        let Some(path) = injection.target(config) else {
            warn!("注入描述 {} 没有记录目标文件，跳过", tag);
            outcome.skipped += 1;
            continue;
        };
        let mut file = match ast::parse(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("跳过注入 {}: {}", tag, e);
                outcome.skipped += 1;
                continue;
            }
        };
        if !injection.rollback(&mut file) {
            debug!("[filepath:{}] 没有需要回滚的注入代码", path.display());
            continue;
        }
        ast::format(&path, &file).await?;
        info!("[filepath:{}] 回滚注入代码成功", path.display());
        outcome.reverted += 1;
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::AutoCodeError;

    const ENTER: &str = "package example\n\ntype ApiGroup struct {\n\tCustomerApi\n\tFooApi\n}\n";

    fn injections(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_reverse_skips_unknown_and_missing_targets() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        let enter = config.server_root().join("api/v1/example/enter.go");
        std::fs::create_dir_all(enter.parent().unwrap()).unwrap();
        std::fs::write(&enter, ENTER).unwrap();

        let records = injections(&[
            (
                "PackageApiModuleEnter",
                r#"{"RelativePath":"server/api/v1/example/enter.go","StructName":"FooApi"}"#,
            ),
            (
                "PackageRouterModuleEnter",
                r#"{"RelativePath":"server/router/example/enter.go","StructName":"FooRouter"}"#,
            ),
            ("PackageRetired", "{}"),
        ]);

        let outcome = reverse_injections(&config, &records, false).await.unwrap();
        assert_eq!(outcome, ReverseOutcome { reverted: 1, skipped: 2 });
        assert_eq!(
            std::fs::read_to_string(&enter).unwrap(),
            "package example\n\ntype ApiGroup struct {\n\tCustomerApi\n}\n"
        );

        let again = reverse_injections(&config, &records, false).await.unwrap();
        assert_eq!(again, ReverseOutcome { reverted: 0, skipped: 2 });
    }

    #[tokio::test]
    async fn test_shared_package_enter_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        let enter = config.server_root().join("api/v1/enter.go");
        let content = "package v1\n\nimport \"github.com/acme/server/api/v1/shop\"\n\ntype ApiGroup struct {\n\tShopApiGroup shop.ApiGroup\n}\n";
        std::fs::create_dir_all(enter.parent().unwrap()).unwrap();
        std::fs::write(&enter, content).unwrap();

        let records = injections(&[(
            "PackageApiEnter",
            r#"{"RelativePath":"server/api/v1/enter.go","ImportPath":"\"github.com/acme/server/api/v1/shop\"","StructName":"ApiGroup","PackageName":"shop","PackageStructName":"ShopApiGroup"}"#,
        )]);

        let outcome = reverse_injections(&config, &records, true).await.unwrap();
        assert_eq!(outcome, ReverseOutcome { reverted: 0, skipped: 1 });
        assert_eq!(std::fs::read_to_string(&enter).unwrap(), content);

        let outcome = reverse_injections(&config, &records, false).await.unwrap();
        assert_eq!(outcome, ReverseOutcome { reverted: 1, skipped: 0 });
        assert!(!std::fs::read_to_string(&enter).unwrap().contains("ShopApiGroup"));
    }

    #[tokio::test]
    async fn test_unparsable_target_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        let gorm = config.server_root().join("initialize/gorm_biz.go");
        std::fs::create_dir_all(gorm.parent().unwrap()).unwrap();
        std::fs::write(&gorm, "package initialize\nfunc bizModel() {\n").unwrap();

        let records = injections(&[(
            "PackageInitializeGorm",
            r#"{"RelativePath":"server/initialize/gorm_biz.go","StructName":"Foo","PackageName":"shop"}"#,
        )]);
        let outcome = reverse_injections(&config, &records, false).await.unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_matches!(ast::parse(&gorm).await, Err(AutoCodeError::Parse { .. }));
    }
}
