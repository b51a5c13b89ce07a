// ==========================================
// 导入管道集成测试
// ==========================================
// 测试目标: 解析 → 映射 → 校验 → 查重 → 执行的完整链路
// ==========================================


use customer_pipeline::domain::import::{ConflictPolicy, ValidationLevel};
use customer_pipeline::importer::{
    CustomerImporter, DuplicateResolver, DuplicateResolverImpl, FieldMapper, FieldMapperImpl,
    FileIngestor, ImportExecutorImpl, RowValidator, RowValidatorImpl, UniversalFileIngestor,
};
use customer_pipeline::repository::{CustomerRepository, CustomerRepositoryImpl};
use std::collections::BTreeSet;
use test_helpers::{create_test_db, draft, init_test_logging, make_repos};

const SAMPLE_CSV: &str = "\
Company Name,AWS Tier,Website,Deal Stage,Deal Value USD
Acme,Premier,https://acme.example,Qualified,1000
acme,Advanced,https://acme.example/jp,Lead,2000
Beta,Selected,beta.example,Negotiation,x
";

#[tokio::test]
async fn test_full_pipeline_skip_policy() {
    init_test_logging();

    // 全链路走真实数据库文件（其余用例用内存库）
    let (_db_file, db_path) = create_test_db().unwrap();
    let customer_repo = CustomerRepositoryImpl::new(&db_path).unwrap();

    // 阶段 0: 解析
    let parsed = UniversalFileIngestor
        .parse(SAMPLE_CSV.as_bytes(), "customers.csv")
        .unwrap();
    assert_eq!(parsed.rows.len(), 3);

    // 阶段 1: 映射推断
    let mapping = FieldMapperImpl.auto_detect(&parsed.headers);
    assert_eq!(mapping.target_of("Company Name"), Some("name_en"));
    assert_eq!(mapping.target_of("AWS Tier"), Some("tier"));
    assert_eq!(mapping.target_of("Website"), Some("company_site"));
    FieldMapperImpl.validate_mapping(&mapping).unwrap();

    // 阶段 2: 校验（第 3 行 URL 与金额各一条 warning，无 error）
    let diagnostics = RowValidatorImpl.validate(&parsed.rows, &mapping);
    assert!(diagnostics
        .iter()
        .all(|d| d.level == ValidationLevel::Warning));
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.row == 3));

    // 阶段 3: 文件内查重（Acme/acme 归一化后同名）
    let dups = DuplicateResolverImpl.resolve_intra_file(&parsed.rows, &mapping);
    assert_eq!(dups, BTreeSet::from([1, 2]));

    // 阶段 4: skip 策略执行
    let executor = ImportExecutorImpl::new(customer_repo.clone());
    let result = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Skip, false)
        .await
        .unwrap();

    assert_eq!(result.created, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.updated, 0);
    assert!(result.errors.is_empty());
    assert_eq!(customer_repo.count_customers().await.unwrap(), 2);

    // 落库值抽查: 第 1 行 Acme 的 tier 与金额
    let acme = customer_repo
        .find_by_normalized_name("acme")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(acme.name_en, "Acme");
}

#[tokio::test]
async fn test_pipeline_update_policy_against_existing_store() {
    let (customer_repo, _session_repo) = make_repos();

    // 预置同名客户
    let existing_id = customer_repo.insert_customer(&draft("Acme")).await.unwrap();

    let parsed = UniversalFileIngestor
        .parse(SAMPLE_CSV.as_bytes(), "customers.csv")
        .unwrap();
    let mapping = FieldMapperImpl.auto_detect(&parsed.headers);

    // 跨库查重命中前两行
    let matches = DuplicateResolverImpl.resolve_against_store(
        &parsed.rows,
        &mapping,
        &customer_repo.list_name_index().await.unwrap(),
    );
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().all(|m| m.matched_record_id == existing_id));

    // update 策略: 第 1 行覆盖已有记录，第 2 行覆盖第 1 行的结果
    let executor = ImportExecutorImpl::new(customer_repo.clone());
    let result = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Update, false)
        .await
        .unwrap();

    assert_eq!(result.updated, 2);
    assert_eq!(result.created, 1);
    assert_eq!(customer_repo.count_customers().await.unwrap(), 2);
}

#[tokio::test]
async fn test_pipeline_dry_run_is_pure_and_repeatable() {
    let (customer_repo, _session_repo) = make_repos();

    let parsed = UniversalFileIngestor
        .parse(SAMPLE_CSV.as_bytes(), "customers.csv")
        .unwrap();
    let mapping = FieldMapperImpl.auto_detect(&parsed.headers);
    let executor = ImportExecutorImpl::new(customer_repo.clone());

    let first = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Skip, true)
        .await
        .unwrap();
    let second = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Skip, true)
        .await
        .unwrap();

    assert_eq!(first, second);
    // dry run 中库内始终无同名记录，文件内重复不会被计为 skip
    assert_eq!(first.created, 3);
    assert_eq!(customer_repo.count_customers().await.unwrap(), 0);
}

#[tokio::test]
async fn test_pipeline_row_errors_do_not_abort() {
    let (customer_repo, _session_repo) = make_repos();

    let csv = "Name\nAcme\n,\nBeta\n";
    // 空行被解析层剔除，这里构造主标识为空但行不空的场景
    let csv_with_blank_name = "Name,Tier\n,Premier\nAcme,Advanced\n";

    let parsed = UniversalFileIngestor
        .parse(csv_with_blank_name.as_bytes(), "a.csv")
        .unwrap();
    assert_eq!(parsed.rows.len(), 2);

    let mapping = FieldMapperImpl.auto_detect(&parsed.headers);
    let executor = ImportExecutorImpl::new(customer_repo.clone());
    let result = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Skip, false)
        .await
        .unwrap();

    assert_eq!(result.created, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].row, 1);

    // 另一份正常文件确认执行器状态未被污染
    let parsed = UniversalFileIngestor.parse(csv.as_bytes(), "b.csv").unwrap();
    let mapping = FieldMapperImpl.auto_detect(&parsed.headers);
    let result = executor
        .execute(&parsed.rows, &mapping, ConflictPolicy::Skip, false)
        .await
        .unwrap();
    assert_eq!(result.created, 1);
    assert_eq!(result.skipped, 1);
}
