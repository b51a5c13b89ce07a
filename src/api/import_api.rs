// ==========================================
// 客户管线管理系统 - 导入 API
// ==========================================
// 职责: 编排导入管道（上传/模板/查重/校验/执行）
// 红线: 依赖全部注入，本层不持有全局状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ImportConfig, ImportConfigReader};
use crate::domain::customer::CustomerSummary;
use crate::domain::import::{
    ColumnMapping, ConflictPolicy, DuplicateMatch, ImportResult, ImportSession, ParsedFile,
    RawRow, SessionStatus, ValidationError,
};
use crate::domain::schema::CANONICAL_FIELDS;
use crate::importer::error::ImportError;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_ingestor::UniversalFileIngestor;
use crate::importer::import_executor::ImportExecutorImpl;
use crate::importer::pipeline_trait::{
    CustomerImporter, DuplicateResolver as DuplicateResolverTrait,
    FieldMapper as FieldMapperTrait, FileIngestor, RowValidator as RowValidatorTrait,
};
use crate::importer::row_validator::RowValidator;
use crate::importer::duplicate_resolver::DuplicateResolver;
use crate::repository::customer_repo::CustomerRepository;
use crate::repository::import_session_repo::ImportSessionRepository;
use crate::storage::FileStore;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};
use uuid::Uuid;

/// 上传预览行数
const PREVIEW_ROWS: usize = 5;

// ==========================================
// 响应类型
// ==========================================

/// 上传响应（会话 + 预览 + 推断映射）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub file_path: String,
    pub headers: Vec<String>,
    pub total_rows: usize,
    pub suggested_mapping: ColumnMapping,
    pub preview: Vec<RawRow>,
}

/// 查重汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateSummary {
    pub total: usize,
    pub with_names: usize,
    pub duplicates: usize,
    pub unique: usize,
}

/// 查重报告（文件内 + 跨库）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheckReport {
    pub intra_file: BTreeSet<usize>,
    pub store_matches: Vec<DuplicateMatch>,
    pub summary: DuplicateSummary,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi<R, S, F>
where
    R: CustomerRepository + Clone,
    S: ImportSessionRepository,
    F: FileStore,
{
    customer_repo: R,
    session_repo: S,
    file_store: F,
    config: ImportConfig,
}

impl<R, S, F> ImportApi<R, S, F>
where
    R: CustomerRepository + Clone + Send + Sync + 'static,
    S: ImportSessionRepository,
    F: FileStore,
{
    pub fn new(customer_repo: R, session_repo: S, file_store: F, config: ImportConfig) -> Self {
        Self {
            customer_repo,
            session_repo,
            file_store,
            config,
        }
    }

    /// 上传文件: 校验限额 → 解析 → 落地 → 创建会话
    ///
    /// # 返回
    /// - Ok(UploadResponse): 会话 id、表头、预览行与推断映射
    /// - Err: 超限、格式不支持、解析失败
    pub async fn upload(&self, bytes: &[u8], file_name: &str) -> ApiResult<UploadResponse> {
        let size = bytes.len() as u64;
        let max = self.config.max_file_size_bytes();
        if size > max {
            return Err(ImportError::FileTooLarge { size, max }.into());
        }

        let parsed = UniversalFileIngestor.parse(bytes, file_name)?;
        let suggested_mapping = FieldMapper.auto_detect(&parsed.headers);

        // 过期会话顺手清理（失败只告警，不影响本次上传）
        if let Err(e) = self.session_repo.delete_expired_sessions(Utc::now()).await {
            warn!("过期会话清理失败: {}", e);
        }

        let file_path = self.file_store.store(file_name, bytes)?;

        let now = Utc::now();
        let session = ImportSession {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            file_size: size,
            file_path: file_path.clone(),
            total_rows: parsed.rows.len(),
            status: SessionStatus::Uploaded,
            results_json: None,
            created_at: now,
            completed_at: None,
            expires_at: now + Duration::days(self.config.session_retention_days()),
        };
        self.session_repo.insert_session(&session).await?;

        info!(
            "上传完成: session={}, file={}, {} 行",
            session.id,
            file_name,
            parsed.rows.len()
        );

        let preview = parsed.rows.iter().take(PREVIEW_ROWS).cloned().collect();
        Ok(UploadResponse {
            session_id: session.id,
            file_path,
            headers: parsed.headers,
            total_rows: parsed.rows.len(),
            suggested_mapping,
            preview,
        })
    }

    /// 生成导入模板 CSV（表头为目录字段 key + 一行示例数据，纯常量）
    pub fn template(&self) -> String {
        let headers: Vec<&str> = CANONICAL_FIELDS.iter().map(|f| f.key).collect();
        let example = [
            "Acme Corporation",
            "アクメ株式会社",
            "https://acme.example.com",
            "Premier",
            "EC2 / S3 / RDS",
            "High",
            "✓",
            "-",
            "Taro Yamada",
            "Hanako Sato",
            "John Smith",
            "Jane Doe",
            "Qualified",
            "50000",
            "7500000",
        ];
        format!("{}\n{}\n", headers.join(","), example.join(","))
    }

    /// 行校验（结果作为数据返回，error 级阻断提交由调用方决定）
    pub fn validate_rows(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
    ) -> Vec<ValidationError> {
        RowValidator.validate(rows, mapping)
    }

    /// 查重: 文件内 + 跨库（单次整表投影）
    pub async fn check_duplicates(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
    ) -> ApiResult<DuplicateCheckReport> {
        // 主标识未映射时查重无意义
        if !mapping.has_primary() {
            return Err(ImportError::FieldMappingRequired.into());
        }

        let existing: Vec<CustomerSummary> = self.customer_repo.list_name_index().await?;

        let resolver = DuplicateResolver;
        let intra_file = resolver.resolve_intra_file(rows, mapping);
        let store_matches = resolver.resolve_against_store(rows, mapping, &existing);

        // 命中任一类查重的行都计入 duplicates
        let mut duplicate_rows: BTreeSet<usize> = intra_file.clone();
        duplicate_rows.extend(store_matches.iter().map(|m| m.row_index));

        let with_names = rows
            .iter()
            .filter(|row| {
                row.cells.iter().any(|(column, value)| {
                    mapping.target_of(column) == Some("name_en") && !value.trim().is_empty()
                })
            })
            .count();

        let summary = DuplicateSummary {
            total: rows.len(),
            with_names,
            duplicates: duplicate_rows.len(),
            unique: with_names.saturating_sub(duplicate_rows.len()),
        };

        Ok(DuplicateCheckReport {
            intra_file,
            store_matches,
            summary,
        })
    }

    /// 执行导入: 会话校验 → 文件读回重解析 → 映射确认 → 分批落库 → 会话收尾
    ///
    /// # 参数
    /// - mapping: 操作者确认后的列映射；None 时按表头自动推断
    /// - dry_run: true 时只统计不落库，会话转入 PREVIEWED
    pub async fn execute(
        &self,
        session_id: &str,
        mapping: Option<&ColumnMapping>,
        policy: ConflictPolicy,
        dry_run: bool,
    ) -> ApiResult<ImportResult> {
        let session = self
            .session_repo
            .get_session(session_id)
            .await?
            .ok_or_else(|| ImportError::SessionNotFound(session_id.to_string()))?;

        let now = Utc::now();
        if session.is_expired(now) {
            return Err(ImportError::SessionExpired(session_id.to_string()).into());
        }

        let bytes = self.file_store.load(&session.file_path)?;
        let parsed: ParsedFile = UniversalFileIngestor.parse(&bytes, &session.file_name)?;

        let mapper = FieldMapper;
        let mapping = match mapping {
            Some(m) => m.clone(),
            None => mapper.auto_detect(&parsed.headers),
        };
        mapper.validate_mapping(&mapping)?;

        let executor = ImportExecutorImpl::with_batch_size(
            self.customer_repo.clone(),
            self.config.execute_batch_size(),
        );
        let result = executor
            .execute(&parsed.rows, &mapping, policy, dry_run)
            .await?;

        // 会话收尾: dry run 终态为 PREVIEWED，正式执行为 COMPLETED
        let status = if dry_run {
            SessionStatus::Previewed
        } else {
            SessionStatus::Completed
        };
        let results_json = serde_json::to_string(&result)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        self.session_repo
            .finalize_session(
                session_id,
                status,
                parsed.rows.len(),
                &results_json,
                Utc::now(),
            )
            .await?;

        info!(
            "导入会话收尾: session={}, status={}, created={}, updated={}, skipped={}",
            session_id,
            status.as_str(),
            result.created,
            result.updated,
            result.skipped
        );
        Ok(result)
    }
}
