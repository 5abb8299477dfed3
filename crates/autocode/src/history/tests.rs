use std::collections::BTreeMap;

use assert_matches::assert_matches;
use autocode_entity::{casbin_rule, sys_api, sys_base_menu, sys_export_template};
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tempfile::TempDir;

use super::*;
use crate::ast::{Ast, GoSource, PackageEnter};
use crate::database::setup_database;

const ENTER: &str = r#"package v1

import "github.com/acme/server/api/v1/example"

var ApiGroupApp = new(ApiGroup)

type ApiGroup struct {
	ExampleApiGroup example.ApiGroup
}
"#;

const SERVER_LANG: &str = r#"{
  "system": {
    "menu": {
      "exampleCustomer": "客户",
      "fooFoo": "Foo"
    },
    "api": {
      "group": {
        "fooFoo": "Foo"
      },
      "desc": {
        "addfooFoo": "新增Foo",
        "listfooFoo": "Foo列表"
      }
    }
  }
}
"#;

const WEB_LOCALE: &str = r#"{
  "foo": {
    "Foo": "Foo"
  },
  "example": {
    "Customer": "客户"
  }
}
"#;

struct Project {
    _dir: TempDir,
    config: AutoCodeConfig,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AutoCodeConfig::new(dir.path());
        Self { _dir: dir, config }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.config.absolute(relative)
    }

    fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap()
    }
}

fn enter_injection() -> PackageEnter {
    PackageEnter {
        relative_path: "server/api/v1/enter.go".to_string(),
        import_path: r#""github.com/acme/server/api/v1/foo""#.to_string(),
        struct_name: "ApiGroup".to_string(),
        package_name: "foo".to_string(),
        package_struct_name: "FooApi".to_string(),
        ..Default::default()
    }
}

/// 模拟一次代码生成：写文件、注入、登记 API/菜单/表/语言包，并写入历史记录
async fn generate(project: &Project, service: &AutoCodeHistoryService) -> sys_auto_code_history::Model {
    let api_file = project.write("server/api/foo.go", "package api\n");
    project.write("web/src/view/foo/foo.vue", "<template></template>\n");

    let mut enter = GoSource::parse(ENTER).unwrap();
    assert!(enter_injection().inject(&mut enter));
    project.write("server/api/v1/enter.go", enter.as_str());
    project.write("server/resource/lang/zh-cn.json", SERVER_LANG);
    project.write("web/src/locales/zh-cn/index.json", WEB_LOCALE);

    let db = &service.db;
    db.execute_unprepared("CREATE TABLE foos (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();
    for (path, method) in legacy_routes("foo", "Foo") {
        sys_api::ActiveModel {
            path: Set(path.clone()),
            description: Set(String::new()),
            api_group: Set("foo".to_string()),
            method: Set(method.clone()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        casbin_rule::ActiveModel {
            ptype: Set("p".to_string()),
            v0: Set("888".to_string()),
            v1: Set(path),
            v2: Set(method),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }
    let menu = sys_base_menu::ActiveModel {
        parent_id: Set(0),
        path: Set("foo".to_string()),
        name: Set("foo".to_string()),
        component: Set("view/foo/foo.vue".to_string()),
        title: Set("Foo".to_string()),
        sort: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    let export = sys_export_template::ActiveModel {
        db_name: Set(String::new()),
        name: Set("Foo".to_string()),
        table_name: Set("foos".to_string()),
        template_id: Set("Foo".to_string()),
        template_info: Set("{}".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    let mut templates = BTreeMap::new();
    templates.insert("api/foo.go".to_string(), api_file.to_string_lossy().into_owned());
    templates.insert("web/view/foo/foo.vue".to_string(), "view/foo/foo.vue".to_string());
    templates.insert("readme".to_string(), "readme.md".to_string());
    let mut injections = BTreeMap::new();
    injections.insert(
        "PackageApiEnter".to_string(),
        serde_json::to_string(&enter_injection()).unwrap(),
    );

    service
        .create(HistoryCreate {
            table: "foos".to_string(),
            package: "foo".to_string(),
            request: r#"{"structName":"Foo"}"#.to_string(),
            struct_name: "Foo".to_string(),
            abbreviation: "foo".to_string(),
            templates,
            injections,
            menu_id: menu.id,
            export_template_id: export.id,
            ..Default::default()
        })
        .await
        .unwrap()
}

fn legacy_routes(prefix: &str, name: &str) -> Vec<(String, String)> {
    legacy_api_routes(&sys_auto_code_history::Model {
        id: 0,
        created_at: String::new(),
        updated_at: String::new(),
        table_name: String::new(),
        package: String::new(),
        request: String::new(),
        struct_name: name.to_string(),
        abbreviation: prefix.to_string(),
        business_db: String::new(),
        description: String::new(),
        templates: String::new(),
        injections: String::new(),
        api_ids: String::new(),
        menu_id: 0,
        export_template_id: 0,
        flag: 0,
    })
}

async fn service(project: &Project) -> AutoCodeHistoryService {
    let db = setup_database("sqlite::memory:").await.unwrap();
    AutoCodeHistoryService::new(project.config.clone(), DbRegistry::new(db))
}

async fn table_exists(db: &DatabaseConnection, table: &str) -> bool {
    db.execute_unprepared(&format!("SELECT * FROM {table}")).await.is_ok()
}

#[tokio::test]
async fn test_rollback_quarantines_files_and_reverts_injections() {
    let project = Project::new();
    let service = service(&project).await;
    let history = generate(&project, &service).await;
    assert!(project.read("server/api/v1/enter.go").contains("FooApi foo.ApiGroup"));

    let report = service.rollback(RollbackRequest::new(history.id)).await.unwrap();

    assert!(!project.path("server/api/foo.go").exists());
    assert!(!project.path("web/src/view/foo/foo.vue").exists());
    assert_eq!(report.moved.len(), 2);
    assert!(report.trash_dir.starts_with(project.config.root.join("rm_file")));
    assert!(report.trash_dir.join("server/api/foo.go").exists());
    assert!(report.trash_dir.join("web/src/view/foo/foo.vue").exists());
    assert_eq!(std::fs::read_to_string(report.trash_dir.join("server/api/foo.go")).unwrap(), "package api\n");

    assert_eq!(project.read("server/api/v1/enter.go"), ENTER);
    assert_eq!(report.injections_reverted, 1);
    assert_eq!(report.injections_skipped, 0);

    let stored = service.find(history.id).await.unwrap();
    assert_eq!(stored.flag, FLAG_ROLLED_BACK);

    // 三个开关都关闭时 API、菜单、数据表保持不变，导出模板总是删除
    assert_eq!(sys_api::Entity::find().count(&service.db).await.unwrap(), 6);
    assert_eq!(casbin_rule::Entity::find().count(&service.db).await.unwrap(), 6);
    assert!(sys_base_menu::Entity::find_by_id(history.menu_id)
        .one(&service.db)
        .await
        .unwrap()
        .is_some());
    assert!(table_exists(&service.db, "foos").await);
    assert!(sys_export_template::Entity::find_by_id(history.export_template_id)
        .one(&service.db)
        .await
        .unwrap()
        .is_none());

    // 后端语言包只在删除菜单/API 时清理，前端语言包总是清理
    assert_eq!(project.read("server/resource/lang/zh-cn.json"), SERVER_LANG);
    let web = project.read("web/src/locales/zh-cn/index.json");
    assert!(!web.contains("\"Foo\""));
    assert!(web.contains("\"Customer\": \"客户\""));
    assert_eq!(report.locale_files_rewritten, 1);
}

#[tokio::test]
async fn test_rollback_with_all_deletions() {
    let project = Project::new();
    let service = service(&project).await;
    let history = generate(&project, &service).await;
    let unrelated = sys_api::ActiveModel {
        path: Set("/customer/createCustomer".to_string()),
        description: Set(String::new()),
        api_group: Set("customer".to_string()),
        method: Set("POST".to_string()),
        ..Default::default()
    }
    .insert(&service.db)
    .await
    .unwrap();

    let report = service
        .rollback(RollbackRequest {
            id: history.id,
            delete_api: true,
            delete_menu: true,
            delete_table: true,
        })
        .await
        .unwrap();

    let remaining: Vec<i32> = sys_api::Entity::find()
        .all(&service.db)
        .await
        .unwrap()
        .into_iter()
        .map(|api| api.id)
        .collect();
    assert_eq!(remaining, vec![unrelated.id]);
    assert_eq!(casbin_rule::Entity::find().count(&service.db).await.unwrap(), 0);
    assert!(sys_base_menu::Entity::find_by_id(history.menu_id)
        .one(&service.db)
        .await
        .unwrap()
        .is_none());
    assert!(!table_exists(&service.db, "foos").await);

    let lang: serde_json::Value = serde_json::from_str(&project.read("server/resource/lang/zh-cn.json")).unwrap();
    assert_eq!(
        lang,
        serde_json::json!({
            "system": {
                "menu": { "exampleCustomer": "客户" },
                "api": { "group": {}, "desc": {} }
            }
        })
    );
    assert_eq!(report.locale_files_rewritten, 2);
}

#[tokio::test]
async fn test_rollback_with_stored_api_ids() {
    let project = Project::new();
    let service = service(&project).await;
    let keep = sys_api::ActiveModel {
        path: Set("/foo/createFoo".to_string()),
        description: Set(String::new()),
        api_group: Set("foo".to_string()),
        method: Set("POST".to_string()),
        ..Default::default()
    }
    .insert(&service.db)
    .await
    .unwrap();
    let generated = sys_api::ActiveModel {
        path: Set("/bar/custom".to_string()),
        description: Set(String::new()),
        api_group: Set("foo".to_string()),
        method: Set("GET".to_string()),
        ..Default::default()
    }
    .insert(&service.db)
    .await
    .unwrap();
    let history = service
        .create(HistoryCreate {
            package: "foo".to_string(),
            struct_name: "Foo".to_string(),
            abbreviation: "foo".to_string(),
            api_ids: vec![generated.id],
            ..Default::default()
        })
        .await
        .unwrap();

    let mut request = RollbackRequest::new(history.id);
    request.delete_api = true;
    service.rollback(request).await.unwrap();

    let remaining: Vec<i32> = sys_api::Entity::find()
        .all(&service.db)
        .await
        .unwrap()
        .into_iter()
        .map(|api| api.id)
        .collect();
    assert_eq!(remaining, vec![keep.id]);
}

#[tokio::test]
async fn test_rollback_tolerates_missing_menu() {
    let project = Project::new();
    let service = service(&project).await;
    let history = generate(&project, &service).await;
    sys_base_menu::Entity::delete_by_id(history.menu_id)
        .exec(&service.db)
        .await
        .unwrap();

    let mut request = RollbackRequest::new(history.id);
    request.delete_menu = true;
    service.rollback(request).await.unwrap();

    assert!(service.find(history.id).await.unwrap().is_rolled_back());
    let lang: serde_json::Value = serde_json::from_str(&project.read("server/resource/lang/zh-cn.json")).unwrap();
    assert!(lang["system"]["menu"].get("fooFoo").is_none());
    assert_eq!(lang["system"]["menu"]["exampleCustomer"], "客户");
    assert_eq!(lang["system"]["api"]["group"]["fooFoo"], "Foo");
}

#[tokio::test]
async fn test_rollback_twice_is_idempotent() {
    let project = Project::new();
    let service = service(&project).await;
    let history = generate(&project, &service).await;
    let request = RollbackRequest {
        id: history.id,
        delete_api: true,
        delete_menu: true,
        delete_table: true,
    };

    let first = service.rollback(request).await.unwrap();
    let enter = project.read("server/api/v1/enter.go");
    let lang = project.read("server/resource/lang/zh-cn.json");
    let web = project.read("web/src/locales/zh-cn/index.json");

    let second = service.rollback(request).await.unwrap();
    assert!(second.moved.is_empty());
    assert_eq!(second.injections_reverted, 0);
    assert_eq!(second.locale_files_rewritten, 0);
    assert_eq!(project.read("server/api/v1/enter.go"), enter);
    assert_eq!(project.read("server/resource/lang/zh-cn.json"), lang);
    assert_eq!(project.read("web/src/locales/zh-cn/index.json"), web);
    assert!(first.trash_dir.join("server/api/foo.go").exists());
    assert!(service.find(history.id).await.unwrap().is_rolled_back());

    // 已回滚的记录不再改写
    let mut stored = service.find(history.id).await.unwrap().into_active_model();
    stored.updated_at = Set("2000-01-01 00:00:00".to_string());
    stored.update(&service.db).await.unwrap();
    service.rollback(request).await.unwrap();
    let stored = service.find(history.id).await.unwrap();
    assert_eq!(stored.updated_at, "2000-01-01 00:00:00");
    assert_eq!(stored.flag, FLAG_ROLLED_BACK);
}

#[tokio::test]
async fn test_package_enter_kept_while_package_in_use() {
    let project = Project::new();
    let service = service(&project).await;
    let foo = generate(&project, &service).await;
    let mut injections = BTreeMap::new();
    injections.insert(
        "PackageApiEnter".to_string(),
        serde_json::to_string(&enter_injection()).unwrap(),
    );
    let bar = service
        .create(HistoryCreate {
            table: "bars".to_string(),
            package: "foo".to_string(),
            struct_name: "Bar".to_string(),
            abbreviation: "bar".to_string(),
            injections,
            ..Default::default()
        })
        .await
        .unwrap();

    let report = service.rollback(RollbackRequest::new(foo.id)).await.unwrap();
    assert_eq!(report.injections_reverted, 0);
    assert_eq!(report.injections_skipped, 1);
    assert!(service.repeat("", "Bar", "foo").await.unwrap());
    assert!(project.read("server/api/v1/enter.go").contains("FooApi foo.ApiGroup"));

    // 包内最后一条记录回滚时才删除分组字段
    let report = service.rollback(RollbackRequest::new(bar.id)).await.unwrap();
    assert_eq!(report.injections_reverted, 1);
    assert_eq!(project.read("server/api/v1/enter.go"), ENTER);
}

#[tokio::test]
async fn test_package_enter_of_other_business_database_is_reverted() {
    let project = Project::new();
    let service = service(&project).await;
    let foo = generate(&project, &service).await;
    service
        .create(HistoryCreate {
            package: "foo".to_string(),
            struct_name: "Bar".to_string(),
            business_db: "archive".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let report = service.rollback(RollbackRequest::new(foo.id)).await.unwrap();
    assert_eq!(report.injections_reverted, 1);
    assert_eq!(project.read("server/api/v1/enter.go"), ENTER);
}

#[tokio::test]
async fn test_unknown_business_database_aborts_before_files() {
    let project = Project::new();
    let service = service(&project).await;
    let api_file = project.write("server/api/foo.go", "package api\n");
    let mut templates = BTreeMap::new();
    templates.insert("api/foo.go".to_string(), api_file.to_string_lossy().into_owned());
    let history = service
        .create(HistoryCreate {
            table: "foos".to_string(),
            business_db: "shop".to_string(),
            package: "foo".to_string(),
            struct_name: "Foo".to_string(),
            templates,
            ..Default::default()
        })
        .await
        .unwrap();

    let mut request = RollbackRequest::new(history.id);
    request.delete_table = true;
    assert_matches!(
        service.rollback(request).await,
        Err(AutoCodeError::Registration { .. })
    );
    assert!(api_file.exists());
    assert!(!service.find(history.id).await.unwrap().is_rolled_back());
}

#[tokio::test]
async fn test_rollback_drops_table_in_business_database() {
    let project = Project::new();
    let default = setup_database("sqlite::memory:").await.unwrap();
    let shop = setup_database("sqlite::memory:").await.unwrap();
    shop.execute_unprepared("CREATE TABLE foos (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();
    default
        .execute_unprepared("CREATE TABLE foos (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();
    let service = AutoCodeHistoryService::new(
        project.config.clone(),
        DbRegistry::new(default.clone()).with_business("shop", shop.clone()),
    );
    let history = service
        .create(HistoryCreate {
            table: "foos".to_string(),
            business_db: "shop".to_string(),
            package: "foo".to_string(),
            struct_name: "Foo".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut request = RollbackRequest::new(history.id);
    request.delete_table = true;
    service.rollback(request).await.unwrap();

    assert!(!table_exists(&shop, "foos").await);
    assert!(table_exists(&default, "foos").await);
}

#[tokio::test]
async fn test_ledger_operations() {
    let project = Project::new();
    let service = service(&project).await;
    assert_matches!(service.first(1).await, Err(AutoCodeError::NotFound(1)));

    let mut ids = Vec::new();
    for name in ["Customer", "Order", "Invoice"] {
        let record = service
            .create(HistoryCreate {
                package: "shop".to_string(),
                struct_name: name.to_string(),
                request: format!(r#"{{"structName":"{name}"}}"#),
                ..Default::default()
            })
            .await
            .unwrap();
        ids.push(record.id);
    }

    assert_eq!(service.first(ids[1]).await.unwrap(), r#"{"structName":"Order"}"#);
    assert!(service.repeat("", "Order", "shop").await.unwrap());
    assert!(!service.repeat("biz", "Order", "shop").await.unwrap());
    assert!(!service.repeat("", "Order", "other").await.unwrap());

    let (page, total) = service.get_list(PageInfo { page: 1, page_size: 2 }).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ids[2], ids[1]]);
    let (page, _) = service.get_list(PageInfo { page: 2, page_size: 2 }).await.unwrap();
    assert_eq!(page.iter().map(|r| r.id).collect::<Vec<_>>(), vec![ids[0]]);
    let (page, _) = service.get_list(PageInfo { page: 0, page_size: 0 }).await.unwrap();
    assert_eq!(page.len(), 3);

    service.rollback(RollbackRequest::new(ids[1])).await.unwrap();
    assert!(!service.repeat("", "Order", "shop").await.unwrap());

    service.delete(ids[0]).await.unwrap();
    assert_matches!(service.first(ids[0]).await, Err(AutoCodeError::NotFound(_)));
    assert_matches!(
        service.rollback(RollbackRequest::new(ids[0])).await,
        Err(AutoCodeError::NotFound(_))
    );
}
