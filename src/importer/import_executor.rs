// ==========================================
// 客户管线管理系统 - 导入执行器实现
// ==========================================
// 职责: 阶段 4 - 按冲突策略分批落库
// 红线: 单行失败记入 errors 不中止；dry_run 不产生任何写入
// ==========================================

use crate::config::DEFAULT_EXECUTE_BATCH_SIZE;
use crate::domain::import::{ColumnMapping, ConflictPolicy, ImportResult, RawRow, RowError};
use crate::importer::error::ImportError;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::pipeline_trait::{
    CustomerImporter, FieldMapper as FieldMapperTrait,
};
use crate::repository::customer_repo::CustomerRepository;
use async_trait::async_trait;
use tracing::{info, warn};

// ==========================================
// ImportExecutorImpl
// ==========================================
pub struct ImportExecutorImpl<R: CustomerRepository> {
    repo: R,
    batch_size: usize,
}

impl<R: CustomerRepository> ImportExecutorImpl<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            batch_size: DEFAULT_EXECUTE_BATCH_SIZE,
        }
    }

    /// 指定批次大小（测试与调优用）
    pub fn with_batch_size(repo: R, batch_size: usize) -> Self {
        Self {
            repo,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl<R: CustomerRepository> CustomerImporter for ImportExecutorImpl<R> {
    async fn execute(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        policy: ConflictPolicy,
        dry_run: bool,
    ) -> Result<ImportResult, ImportError> {
        let mapper = FieldMapper;
        let mut result = ImportResult::default();

        info!(
            "导入执行开始: {} 行, 策略 {:?}, dry_run={}",
            rows.len(),
            policy,
            dry_run
        );

        for batch in rows.chunks(self.batch_size) {
            for row in batch {
                let draft = mapper.materialize(row, mapping);

                // 主标识为空的行无法落库
                if draft.name_en.trim().is_empty() {
                    result.errors.push(RowError {
                        row: row.row_number,
                        message: "English Name is required".to_string(),
                    });
                    continue;
                }

                // 每行实时查询，前批写入对后批可见
                let existing = match self.repo.find_by_normalized_name(&draft.normalized_name()).await
                {
                    Ok(existing) => existing,
                    Err(e) => {
                        warn!("行 {} 查重失败: {}", row.row_number, e);
                        result.errors.push(RowError {
                            row: row.row_number,
                            message: e.to_string(),
                        });
                        continue;
                    }
                };

                let outcome = match (existing, policy) {
                    // 无同名记录: 任何策略都新建
                    (None, _) | (Some(_), ConflictPolicy::Create) => {
                        if dry_run {
                            Ok(Outcome::Created)
                        } else {
                            self.repo
                                .insert_customer(&draft)
                                .await
                                .map(|_| Outcome::Created)
                        }
                    }
                    (Some(_), ConflictPolicy::Skip) => Ok(Outcome::Skipped),
                    (Some(summary), ConflictPolicy::Update) => {
                        if dry_run {
                            Ok(Outcome::Updated)
                        } else {
                            self.repo
                                .update_customer(summary.id, &draft)
                                .await
                                .map(|_| Outcome::Updated)
                        }
                    }
                };

                match outcome {
                    Ok(Outcome::Created) => result.created += 1,
                    Ok(Outcome::Updated) => result.updated += 1,
                    Ok(Outcome::Skipped) => result.skipped += 1,
                    Err(e) => {
                        warn!("行 {} 落库失败: {}", row.row_number, e);
                        result.errors.push(RowError {
                            row: row.row_number,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            "导入执行完成: created={}, updated={}, skipped={}, errors={}",
            result.created,
            result.updated,
            result.skipped,
            result.errors.len()
        );
        Ok(result)
    }
}

enum Outcome {
    Created,
    Updated,
    Skipped,
}
