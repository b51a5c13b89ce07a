// ==========================================
// 客户管线管理系统 - 查重器实现
// ==========================================
// 职责: 阶段 3 - 文件内查重 + 跨库查重（纯计算，不触库）
// 口径: 主标识 TRIM + 小写后比较
// ==========================================

use crate::domain::customer::CustomerSummary;
use crate::domain::import::{ColumnMapping, DuplicateMatch, RawRow};
use crate::domain::schema::PRIMARY_FIELD_KEY;
use crate::importer::pipeline_trait::DuplicateResolver as DuplicateResolverTrait;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub struct DuplicateResolver;

impl DuplicateResolver {
    /// 取某行主标识的归一化值（未映射或为空时 None）
    fn normalized_primary(row: &RawRow, mapping: &ColumnMapping) -> Option<String> {
        let value = row
            .cells
            .iter()
            .rev()
            .find(|(column, _)| mapping.target_of(column) == Some(PRIMARY_FIELD_KEY))
            .map(|(_, value)| value.trim().to_lowercase())?;
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

impl DuplicateResolverTrait for DuplicateResolver {
    fn resolve_intra_file(&self, rows: &[RawRow], mapping: &ColumnMapping) -> BTreeSet<usize> {
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for row in rows {
            if let Some(name) = Self::normalized_primary(row, mapping) {
                groups.entry(name).or_default().push(row.row_number);
            }
        }

        // 组内数量 > 1 时整组（含第一行）都记为重复
        let duplicates: BTreeSet<usize> = groups
            .into_values()
            .filter(|members| members.len() > 1)
            .flatten()
            .collect();

        debug!("文件内查重: {} 行命中", duplicates.len());
        duplicates
    }

    fn resolve_against_store(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        existing: &[CustomerSummary],
    ) -> Vec<DuplicateMatch> {
        // 已有记录按归一化名建索引（重名时保留先出现的记录）
        let mut index: HashMap<String, &CustomerSummary> = HashMap::new();
        for summary in existing {
            index
                .entry(summary.name_en.trim().to_lowercase())
                .or_insert(summary);
        }

        let mut matches = Vec::new();
        for row in rows {
            let Some(name) = Self::normalized_primary(row, mapping) else {
                continue;
            };
            if let Some(summary) = index.get(&name) {
                matches.push(DuplicateMatch {
                    row_index: row.row_number,
                    matched_record_id: summary.id,
                    matched_display_name: summary.name_en.clone(),
                });
            }
        }

        debug!(
            "跨库查重: {} 行命中（库内 {} 条）",
            matches.len(),
            existing.len()
        );
        matches
    }
}
