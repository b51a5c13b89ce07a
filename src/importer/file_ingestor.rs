// ==========================================
// 客户管线管理系统 - 文件解析器实现
// ==========================================
// 职责: 阶段 0 - 字节流 → 表头 + 原始行
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// ==========================================

use crate::domain::import::{ParsedFile, RawRow};
use crate::importer::error::ImportError;
use crate::importer::pipeline_trait::FileIngestor;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// 取声明文件名的小写扩展名
fn file_extension(declared_name: &str) -> String {
    Path::new(declared_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// 将一行单元格按表头组装为 RawRow（超出表头宽度的单元格丢弃）
fn assemble_row(headers: &[String], values: Vec<String>, row_number: usize) -> RawRow {
    let cells = values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| headers.get(idx).map(|h| (h.clone(), value)))
        .collect();
    RawRow::new(row_number, cells)
}

// ==========================================
// CSV 解析器实现
// ==========================================
pub struct CsvIngestor;

impl FileIngestor for CsvIngestor {
    fn parse(&self, bytes: &[u8], declared_name: &str) -> Result<ParsedFile, ImportError> {
        let ext = file_extension(declared_name);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 首个非空记录作为表头，所以关闭 csv 自带的表头处理
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut row_number = 0usize;

        for result in reader.records() {
            let record = result?;
            let values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // 跳过完全空白的记录
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }

            match &headers {
                None => {
                    headers = Some(values);
                }
                Some(hs) => {
                    row_number += 1;
                    let row = assemble_row(hs, values, row_number);
                    if row.is_blank() {
                        row_number -= 1;
                        continue;
                    }
                    rows.push(row);
                }
            }
        }

        let headers = headers.ok_or(ImportError::EmptyFile)?;
        if rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        debug!("CSV 解析完成: {} 列, {} 行", headers.len(), rows.len());
        Ok(ParsedFile { headers, rows })
    }
}

// ==========================================
// Excel 解析器实现
// ==========================================
pub struct ExcelIngestor;

impl FileIngestor for ExcelIngestor {
    fn parse(&self, bytes: &[u8], declared_name: &str) -> Result<ParsedFile, ImportError> {
        let ext = file_extension(declared_name);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let cursor = Cursor::new(bytes);
        let mut workbook = open_workbook_auto_from_rs(cursor)?;

        // 只读第一个工作表
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::MalformedFile("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut row_number = 0usize;

        for data_row in range.rows() {
            let values: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();

            // 跳过完全空白的行
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }

            match &headers {
                None => {
                    headers = Some(values);
                }
                Some(hs) => {
                    row_number += 1;
                    let row = assemble_row(hs, values, row_number);
                    if row.is_blank() {
                        row_number -= 1;
                        continue;
                    }
                    rows.push(row);
                }
            }
        }

        let headers = headers.ok_or(ImportError::EmptyFile)?;
        if rows.is_empty() {
            return Err(ImportError::EmptyFile);
        }

        debug!(
            "Excel 解析完成: sheet={}, {} 列, {} 行",
            sheet_name,
            headers.len(),
            rows.len()
        );
        Ok(ParsedFile { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileIngestor;

impl FileIngestor for UniversalFileIngestor {
    fn parse(&self, bytes: &[u8], declared_name: &str) -> Result<ParsedFile, ImportError> {
        match file_extension(declared_name).as_str() {
            "csv" => CsvIngestor.parse(bytes, declared_name),
            "xlsx" | "xls" => ExcelIngestor.parse(bytes, declared_name),
            ext => Err(ImportError::UnsupportedFormat(ext.to_string())),
        }
    }
}
