// ==========================================
// 客户管线管理系统 - 行校验器实现
// ==========================================
// 职责: 阶段 2 - 行级诊断（error 阻断 / warning 提示）
// 红线: 校验结果是数据不是异常；诊断读取原始单元格值
// ==========================================

use crate::domain::import::{ColumnMapping, RawRow, ValidationError, ValidationLevel};
use crate::domain::schema::{FieldKind, CANONICAL_FIELDS};
use crate::importer::pipeline_trait::RowValidator as RowValidatorTrait;
use tracing::debug;

/// 绝对 URL 判定（scheme://host 形式）
fn is_absolute_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    if scheme.is_empty() || rest.is_empty() {
        return false;
    }
    // scheme 仅允许字母数字与 +-.，首字符必须是字母
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return false;
    }
    // host 部分非空即可（不做 DNS 级校验）
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    !host.is_empty()
}

pub struct RowValidator;

impl RowValidator {
    /// 取映射到某目标字段的有效值（后出现的源列覆盖先出现的，与物化口径一致）
    fn mapped_value<'a>(row: &'a RawRow, mapping: &ColumnMapping, key: &str) -> Option<&'a str> {
        row.cells
            .iter()
            .rev()
            .find(|(column, _)| mapping.target_of(column) == Some(key))
            .map(|(_, value)| value.as_str())
    }

    fn validate_one(row: &RawRow, mapping: &ColumnMapping, errors: &mut Vec<ValidationError>) {
        for field in CANONICAL_FIELDS {
            let value = Self::mapped_value(row, mapping, field.key);
            let trimmed = value.map(str::trim).unwrap_or("");

            // 必填字段缺失（未映射或值为空）: error 级
            if field.required && trimmed.is_empty() {
                errors.push(ValidationError {
                    row: row.row_number,
                    field: field.key.to_string(),
                    message: format!("{} is required", field.label),
                    level: ValidationLevel::Error,
                });
                continue;
            }

            // 非必填字段为空直接放行
            if trimmed.is_empty() {
                continue;
            }

            // 类型/枚举检查: warning 级（不阻断提交）
            match field.kind {
                FieldKind::Text => {}
                FieldKind::Url => {
                    if !is_absolute_url(trimmed) {
                        errors.push(ValidationError {
                            row: row.row_number,
                            field: field.key.to_string(),
                            message: format!("{} must be a valid URL", field.label),
                            level: ValidationLevel::Warning,
                        });
                    }
                }
                FieldKind::Number => {
                    if trimmed.parse::<f64>().is_err() {
                        errors.push(ValidationError {
                            row: row.row_number,
                            field: field.key.to_string(),
                            message: format!("{} must be a number", field.label),
                            level: ValidationLevel::Warning,
                        });
                    }
                }
                FieldKind::Enum => {
                    if !field.options.contains(&trimmed) {
                        errors.push(ValidationError {
                            row: row.row_number,
                            field: field.key.to_string(),
                            message: format!(
                                "{} must be one of: {}",
                                field.label,
                                field.options.join(", ")
                            ),
                            level: ValidationLevel::Warning,
                        });
                    }
                }
            }
        }
    }
}

impl RowValidatorTrait for RowValidator {
    fn validate(&self, rows: &[RawRow], mapping: &ColumnMapping) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for row in rows {
            Self::validate_one(row, mapping, &mut errors);
        }

        let error_count = errors
            .iter()
            .filter(|e| e.level == ValidationLevel::Error)
            .count();
        debug!(
            "行校验完成: {} 行, {} 条诊断（{} 条 error）",
            rows.len(),
            errors.len(),
            error_count
        );
        errors
    }
}
