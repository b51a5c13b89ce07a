// ==========================================
// 客户管线管理系统 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::customer::{CustomerDraft, CustomerSummary};
use crate::domain::import::{
    ColumnMapping, ConflictPolicy, DuplicateMatch, ImportResult, ParsedFile, RawRow,
    ValidationError,
};
use crate::importer::error::ImportError;
use async_trait::async_trait;
use std::collections::BTreeSet;

// ==========================================
// FileIngestor Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvIngestor, ExcelIngestor, UniversalFileIngestor
pub trait FileIngestor: Send + Sync {
    /// 解析文件字节流为表头 + 原始行
    ///
    /// # 参数
    /// - bytes: 文件完整内容
    /// - declared_name: 上传时声明的文件名（扩展名决定解析器）
    ///
    /// # 返回
    /// - Ok(ParsedFile): 表头与保留行（空行已剔除，行号 1 起）
    /// - Err: 格式不支持、内容损坏、无数据行
    fn parse(&self, bytes: &[u8], declared_name: &str) -> Result<ParsedFile, ImportError>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列映射接口（阶段 1）
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 按表头自动推断列映射
    ///
    /// # 参数
    /// - headers: 源文件表头（按列顺序）
    ///
    /// # 返回
    /// - ColumnMapping: 命中的映射（未命中的源列不出现在结果中）
    ///
    /// # 说明
    /// - 匹配优先级: key/显示名精确 > 包含匹配 > 别名表
    /// - 各源列独立匹配，多个源列可命中同一目标字段（物化时后写覆盖）
    fn auto_detect(&self, headers: &[String]) -> ColumnMapping;

    /// 校验列映射是否可用于执行
    ///
    /// # 返回
    /// - Err(MissingRequiredField): 必填字段未映射或映射了多个源列
    fn validate_mapping(&self, mapping: &ColumnMapping) -> Result<(), ImportError>;

    /// 将原始行按映射物化为客户草稿
    ///
    /// # 说明
    /// - 同一目标字段被多个源列命中时，后出现的列覆盖先出现的列
    /// - 文本 TRIM 后为空 → None；金额解析失败 → 0；非法枚举 → None
    fn materialize(&self, row: &RawRow, mapping: &ColumnMapping) -> CustomerDraft;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 行级校验接口（阶段 2）
// 实现者: RowValidatorImpl
pub trait RowValidator: Send + Sync {
    /// 校验全部行，返回诊断列表（校验失败不是异常）
    ///
    /// # 参数
    /// - rows: 保留行列表
    /// - mapping: 已冻结的列映射
    ///
    /// # 返回
    /// - Vec<ValidationError>: error 级阻断提交，warning 级仅提示
    fn validate(&self, rows: &[RawRow], mapping: &ColumnMapping) -> Vec<ValidationError>;
}

// ==========================================
// DuplicateResolver Trait
// ==========================================
// 用途: 查重接口（阶段 3），纯计算，不触库
// 实现者: DuplicateResolverImpl
pub trait DuplicateResolver: Send + Sync {
    /// 文件内查重（归一化主标识相同的行互为重复）
    ///
    /// # 返回
    /// - BTreeSet<usize>: 重复组内全部行的 row_number（含组内第一行）
    fn resolve_intra_file(&self, rows: &[RawRow], mapping: &ColumnMapping) -> BTreeSet<usize>;

    /// 跨库查重（与已有记录的归一化主标识比对）
    ///
    /// # 参数
    /// - existing: 已有记录的 {id, name_en} 投影
    ///
    /// # 返回
    /// - Vec<DuplicateMatch>: 每个命中行附带库内记录 id 与显示名
    fn resolve_against_store(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        existing: &[CustomerSummary],
    ) -> Vec<DuplicateMatch>;
}

// ==========================================
// CustomerImporter Trait
// ==========================================
// 用途: 导入执行接口（阶段 4）
// 实现者: ImportExecutorImpl
#[async_trait]
pub trait CustomerImporter: Send + Sync {
    /// 按冲突策略批量执行导入
    ///
    /// # 参数
    /// - rows: 保留行列表
    /// - mapping: 已冻结的列映射（调用方保证已通过 validate_mapping）
    /// - policy: 冲突策略（skip/update/create）
    /// - dry_run: true 时只计数，不产生任何写入
    ///
    /// # 返回
    /// - Ok(ImportResult): created/updated/skipped 计数 + 行级错误列表
    /// - Err: 仅基础设施不可用时（单行失败记入 errors，不中止）
    ///
    /// # 说明
    /// - 行按固定批次大小分批处理，批内逐行独立提交
    /// - 每行重新查询已有记录，前批写入对后批可见
    async fn execute(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        policy: ConflictPolicy,
        dry_run: bool,
    ) -> Result<ImportResult, ImportError>;
}
