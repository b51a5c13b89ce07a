// ==========================================
// 导入 API 集成测试
// ==========================================
// 测试目标: 上传/模板/查重/执行的边界行为与会话生命周期
// ==========================================


use chrono::{Duration, Utc};
use customer_pipeline::api::{ApiError, ImportApi};
use customer_pipeline::config::ImportConfig;
use customer_pipeline::domain::import::{
    ConflictPolicy, ImportSession, SessionStatus, ValidationLevel,
};
use customer_pipeline::importer::ImportError;
use customer_pipeline::repository::{
    CustomerRepository, CustomerRepositoryImpl, ImportSessionRepository,
    ImportSessionRepositoryImpl,
};
use customer_pipeline::storage::LocalFileStore;
use tempfile::TempDir;
use test_helpers::{create_test_db, draft, make_repos, name_mapping, name_row};

const SAMPLE_CSV: &str = "\
Company Name,AWS Tier
Acme,Premier
Beta,Advanced
";

fn make_api(
    config: ImportConfig,
) -> (
    ImportApi<CustomerRepositoryImpl, ImportSessionRepositoryImpl, LocalFileStore>,
    CustomerRepositoryImpl,
    ImportSessionRepositoryImpl,
    TempDir,
) {
    let (customer_repo, session_repo) = make_repos();
    let dir = TempDir::new().unwrap();
    let api = ImportApi::new(
        customer_repo.clone(),
        session_repo.clone(),
        LocalFileStore::new(dir.path()),
        config,
    );
    (api, customer_repo, session_repo, dir)
}

#[tokio::test]
async fn test_upload_creates_session_with_preview() {
    let (api, _customers, sessions, _dir) = make_api(ImportConfig::default());

    let response = api
        .upload(SAMPLE_CSV.as_bytes(), "customers.csv")
        .await
        .unwrap();

    assert_eq!(response.headers, vec!["Company Name", "AWS Tier"]);
    assert_eq!(response.total_rows, 2);
    assert_eq!(response.preview.len(), 2);
    assert_eq!(
        response.suggested_mapping.target_of("Company Name"),
        Some("name_en")
    );

    let session = sessions
        .get_session(&response.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Uploaded);
    assert_eq!(session.file_name, "customers.csv");
    assert_eq!(session.total_rows, 2);
    assert_eq!(session.file_path, response.file_path);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let config = ImportConfig {
        max_file_size_bytes: 16,
        ..Default::default()
    };
    let (api, _customers, _sessions, _dir) = make_api(config);

    let err = api
        .upload(SAMPLE_CSV.as_bytes(), "customers.csv")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::FileTooLarge { .. })
    ));
}

#[tokio::test]
async fn test_upload_rejects_unknown_extension() {
    let (api, _customers, _sessions, _dir) = make_api(ImportConfig::default());

    let err = api.upload(b"junk", "notes.txt").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_template_contains_catalog_and_example() {
    let (customer_repo, session_repo) = make_repos();
    let dir = TempDir::new().unwrap();
    let api = ImportApi::new(
        customer_repo,
        session_repo,
        LocalFileStore::new(dir.path()),
        ImportConfig::default(),
    );

    let template = api.template();
    let mut lines = template.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("name_en,name_jp,"));
    assert!(header.contains("deal_stage"));
    assert_eq!(header.split(',').count(), 15);

    // 模板自带一行示例数据
    let example = lines.next().unwrap();
    assert!(example.contains("Acme Corporation"));
    assert_eq!(lines.next(), None);

    // 模板列数与示例列数一致
    assert_eq!(header.split(',').count(), example.split(',').count());
}

#[tokio::test]
async fn test_check_duplicates_reports_summary() {
    let (api, customers, _sessions, _dir) = make_api(ImportConfig::default());
    customers.insert_customer(&draft("Beta")).await.unwrap();

    let rows = vec![
        name_row(1, "Acme"),
        name_row(2, "acme"),
        name_row(3, "Beta"),
        name_row(4, ""),
    ];
    let report = api.check_duplicates(&rows, &name_mapping()).await.unwrap();

    assert_eq!(report.intra_file, std::collections::BTreeSet::from([1, 2]));
    assert_eq!(report.store_matches.len(), 1);
    assert_eq!(report.store_matches[0].row_index, 3);

    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.with_names, 3);
    assert_eq!(report.summary.duplicates, 3);
    assert_eq!(report.summary.unique, 0);
}

#[tokio::test]
async fn test_check_duplicates_requires_primary_mapping() {
    let (api, _customers, _sessions, _dir) = make_api(ImportConfig::default());

    let rows = vec![name_row(1, "Acme")];
    let unmapped = customer_pipeline::domain::import::ColumnMapping::new();

    let err = api.check_duplicates(&rows, &unmapped).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::FieldMappingRequired)
    ));
}

#[tokio::test]
async fn test_validate_rows_via_api() {
    let (api, _customers, _sessions, _dir) = make_api(ImportConfig::default());

    let rows = vec![name_row(1, ""), name_row(2, "Beta")];
    let diagnostics = api.validate_rows(&rows, &name_mapping());

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].row, 1);
    assert_eq!(diagnostics[0].level, ValidationLevel::Error);
}

#[tokio::test]
async fn test_execute_end_to_end_with_auto_mapping() {
    // 端到端用例走真实数据库文件，两个仓储各持一条到同一库的连接
    let (_db_file, db_path) = create_test_db().unwrap();
    let customers = CustomerRepositoryImpl::new(&db_path).unwrap();
    let sessions = ImportSessionRepositoryImpl::new(&db_path).unwrap();
    let dir = TempDir::new().unwrap();
    let api = ImportApi::new(
        customers.clone(),
        sessions.clone(),
        LocalFileStore::new(dir.path()),
        ImportConfig::default(),
    );

    let response = api
        .upload(SAMPLE_CSV.as_bytes(), "customers.csv")
        .await
        .unwrap();

    // 不传映射时按表头自动推断
    let result = api
        .execute(&response.session_id, None, ConflictPolicy::Skip, false)
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(customers.count_customers().await.unwrap(), 2);

    let session = sessions
        .get_session(&response.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert!(session.completed_at.is_some());
    let results_json = session.results_json.unwrap();
    assert!(results_json.contains("\"created\":2"));
}

#[tokio::test]
async fn test_execute_dry_run_marks_previewed() {
    let (api, customers, sessions, _dir) = make_api(ImportConfig::default());

    let response = api
        .upload(SAMPLE_CSV.as_bytes(), "customers.csv")
        .await
        .unwrap();
    let result = api
        .execute(&response.session_id, None, ConflictPolicy::Skip, true)
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(customers.count_customers().await.unwrap(), 0);

    let session = sessions
        .get_session(&response.session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.status, SessionStatus::Previewed);
}

#[tokio::test]
async fn test_execute_with_confirmed_mapping() {
    let (api, customers, _sessions, _dir) = make_api(ImportConfig::default());

    // 表头完全无法自动识别的文件
    let csv = "col_a,col_b\nAcme,Premier\n";
    let response = api.upload(csv.as_bytes(), "oddly_named.csv").await.unwrap();
    assert!(response.suggested_mapping.is_empty());

    // 自动推断缺主标识时报错
    let err = api
        .execute(&response.session_id, None, ConflictPolicy::Skip, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::MissingRequiredField(_))
    ));

    // 操作者确认映射后执行成功
    let mut mapping = customer_pipeline::domain::import::ColumnMapping::new();
    mapping.set("col_a", "name_en");
    mapping.set("col_b", "tier");

    let result = api
        .execute(
            &response.session_id,
            Some(&mapping),
            ConflictPolicy::Skip,
            false,
        )
        .await
        .unwrap();
    assert_eq!(result.created, 1);
    assert_eq!(customers.count_customers().await.unwrap(), 1);
}

#[tokio::test]
async fn test_execute_unknown_session_rejected() {
    let (api, _customers, _sessions, _dir) = make_api(ImportConfig::default());

    let err = api
        .execute("no-such-session", None, ConflictPolicy::Skip, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_execute_expired_session_rejected() {
    let (api, _customers, sessions, _dir) = make_api(ImportConfig::default());

    // 直接预置一条已过保留期的会话
    let now = Utc::now();
    let session = ImportSession {
        id: "expired".to_string(),
        file_name: "customers.csv".to_string(),
        file_size: 10,
        file_path: "missing.csv".to_string(),
        total_rows: 0,
        status: SessionStatus::Uploaded,
        results_json: None,
        created_at: now - Duration::days(9),
        completed_at: None,
        expires_at: now - Duration::days(2),
    };
    sessions.insert_session(&session).await.unwrap();

    let err = api
        .execute("expired", None, ConflictPolicy::Skip, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Import(ImportError::SessionExpired(_))
    ));
}

#[tokio::test]
async fn test_upload_sweeps_expired_sessions() {
    let (api, _customers, sessions, _dir) = make_api(ImportConfig::default());

    let now = Utc::now();
    let stale = ImportSession {
        id: "stale".to_string(),
        file_name: "old.csv".to_string(),
        file_size: 10,
        file_path: "old.csv".to_string(),
        total_rows: 0,
        status: SessionStatus::Uploaded,
        results_json: None,
        created_at: now - Duration::days(10),
        completed_at: None,
        expires_at: now - Duration::days(3),
    };
    sessions.insert_session(&stale).await.unwrap();

    api.upload(SAMPLE_CSV.as_bytes(), "customers.csv")
        .await
        .unwrap();

    // 上传顺带清理过期会话
    assert!(sessions.get_session("stale").await.unwrap().is_none());
}
