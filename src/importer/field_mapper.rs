// ==========================================
// 客户管线管理系统 - 字段映射器实现
// ==========================================
// 职责: 阶段 1 - 表头自动推断 + 原始行物化为客户草稿
// ==========================================

use crate::domain::customer::CustomerDraft;
use crate::domain::import::{ColumnMapping, RawRow};
use crate::domain::schema::{find_field, CANONICAL_FIELDS};
use crate::importer::error::ImportError;
use crate::importer::pipeline_trait::FieldMapper as FieldMapperTrait;
use tracing::debug;

/// 常见表头别名 → 目标字段 key（目录未命中时兜底）
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("name", "name_en"),
    ("company name", "name_en"),
    ("english name", "name_en"),
    ("japanese name", "name_jp"),
    ("website", "company_site"),
    ("url", "company_site"),
    ("aws tier", "tier"),
    ("stage", "deal_stage"),
    ("value", "deal_value_usd"),
    ("deal value", "deal_value_usd"),
];

pub struct FieldMapper;

impl FieldMapper {
    /// 单个表头 → 目标字段 key
    fn detect_one(normalized: &str) -> Option<&'static str> {
        if normalized.is_empty() {
            return None;
        }

        // 精确匹配 key 或显示名
        for field in CANONICAL_FIELDS {
            if normalized == field.key || normalized == field.label.to_lowercase() {
                return Some(field.key);
            }
        }

        // 双向包含匹配（表头带前后缀、或只写了 key/显示名的一部分时仍可命中）
        for field in CANONICAL_FIELDS {
            let label = field.label.to_lowercase();
            if normalized.contains(field.key)
                || normalized.contains(&label)
                || field.key.contains(normalized)
                || label.contains(normalized)
            {
                return Some(field.key);
            }
        }

        // 别名表
        HEADER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, key)| *key)
    }

    /// 文本单元格 → Option（TRIM 后为空即 None）
    fn text_value(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// 枚举单元格 → Option（非法值归 None，不阻断导入）
    fn enum_value(raw: &str, options: &[&str]) -> Option<String> {
        Self::text_value(raw).filter(|v| options.contains(&v.as_str()))
    }

    /// 金额单元格 → f64（解析失败回落 0）
    fn money_value(raw: &str) -> f64 {
        raw.trim().parse::<f64>().unwrap_or(0.0)
    }
}

impl FieldMapperTrait for FieldMapper {
    fn auto_detect(&self, headers: &[String]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();

        for header in headers {
            let normalized = header.trim().to_lowercase();
            if let Some(key) = Self::detect_one(&normalized) {
                mapping.set(header.clone(), key);
            }
        }

        debug!("列映射自动推断: {}/{} 列命中", mapping.len(), headers.len());
        mapping
    }

    fn validate_mapping(&self, mapping: &ColumnMapping) -> Result<(), ImportError> {
        // 必填字段必须且只能由一个源列提供
        for field in CANONICAL_FIELDS.iter().filter(|f| f.required) {
            if mapping.columns_mapped_to(field.key) != 1 {
                return Err(ImportError::MissingRequiredField(field.key.to_string()));
            }
        }
        Ok(())
    }

    fn materialize(&self, row: &RawRow, mapping: &ColumnMapping) -> CustomerDraft {
        let mut draft = CustomerDraft::default();

        // 按源列顺序应用映射，同一目标字段后出现的列覆盖先出现的列
        for (column, raw) in &row.cells {
            let Some(key) = mapping.target_of(column) else {
                continue;
            };
            let Some(field) = find_field(key) else {
                continue;
            };

            match field.key {
                "name_en" => {
                    draft.name_en = raw.trim().to_string();
                }
                "name_jp" => draft.name_jp = Self::text_value(raw),
                "company_site" => draft.company_site = Self::text_value(raw),
                "tier" => draft.tier = Self::enum_value(raw, field.options),
                "cloud_usage" => draft.cloud_usage = Self::text_value(raw),
                "priority" => draft.priority = Self::enum_value(raw, field.options),
                "ripple_customer" => draft.ripple_customer = Self::enum_value(raw, field.options),
                "archera_customer" => draft.archera_customer = Self::enum_value(raw, field.options),
                "pic" => draft.pic = Self::text_value(raw),
                "exec" => draft.exec = Self::text_value(raw),
                "alphaus_rep" => draft.alphaus_rep = Self::text_value(raw),
                "alphaus_exec" => draft.alphaus_exec = Self::text_value(raw),
                "deal_stage" => draft.deal_stage = Self::enum_value(raw, field.options),
                "deal_value_usd" => draft.deal_value_usd = Self::money_value(raw),
                "deal_value_jpy" => draft.deal_value_jpy = Self::money_value(raw),
                _ => {}
            }
        }

        draft
    }
}
