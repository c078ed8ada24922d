//! Spreadsheet export
//!
//! Results are first laid out as plain [`Table`]s (sheet name, header, string
//! cells). A [`TabularWriter`] turns those into a file; [`XlsxWriter`] is the
//! only one shipped.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::aggregator::CatalogReport;
use crate::error::ExportError;
use crate::extractors::{ProductDetailRecord, ProductSummaryRow};

pub const DETAIL_SHEET: &str = "Products";
/// Only column of a sheet that has no rows
pub const EMPTY_PLACEHOLDER: &str = "Нет данных";

const MAX_COLUMNS: usize = 16_384;

/// One sheet. An empty string is an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Header as written; a table without rows collapses to the placeholder.
    pub fn header(&self) -> Vec<&str> {
        if self.rows.is_empty() {
            vec![EMPTY_PLACEHOLDER]
        } else {
            self.columns.iter().map(String::as_str).collect()
        }
    }
}

/// One table per successful category, in crawl order.
pub fn catalog_tables(report: &CatalogReport) -> Vec<Table> {
    report
        .categories
        .iter()
        .map(|category| Table {
            name: category.sheet_name.clone(),
            columns: ProductSummaryRow::HEADERS.map(String::from).to_vec(),
            rows: category
                .rows
                .iter()
                .map(|row| row.cells().map(String::from).to_vec())
                .collect(),
        })
        .collect()
}

/// The start-mode sheet: core columns, then every feature label in
/// first-seen order across all records.
///
/// A feature whose label equals a core column name lands in that column and
/// takes precedence over the core value for that record.
pub fn detail_table(records: &[ProductDetailRecord]) -> Table {
    let mut columns: Vec<String> = ProductDetailRecord::CORE_HEADERS
        .map(String::from)
        .to_vec();
    for record in records {
        for label in record.features.labels() {
            if !columns.iter().any(|c| c == label) {
                columns.push(label.to_string());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let core = record.core_cells();
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| match record.features.get(column) {
                    Some(value) => value.to_string(),
                    None => core.get(i).map(|v| v.to_string()).unwrap_or_default(),
                })
                .collect()
        })
        .collect();

    Table {
        name: DETAIL_SHEET.to_string(),
        columns,
        rows,
    }
}

/// Encodes named tables into a spreadsheet file.
pub trait TabularWriter {
    fn encode(&self, tables: &[Table]) -> Result<Vec<u8>, ExportError>;

    /// Encode, write to `path`, and hand the bytes back.
    fn write_file(&self, tables: &[Table], path: &Path) -> Result<Vec<u8>, ExportError> {
        let bytes = self.encode(tables)?;
        fs::write(path, &bytes).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), sheets = tables.len(), bytes = bytes.len(), "saved spreadsheet");
        Ok(bytes)
    }
}

/// `.xlsx` output with a bold header row.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxWriter;

impl TabularWriter for XlsxWriter {
    fn encode(&self, tables: &[Table]) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        for table in tables {
            let header = table.header();
            if header.len() > MAX_COLUMNS {
                return Err(ExportError::TooManyColumns {
                    sheet: table.name.clone(),
                });
            }

            let sheet = workbook.add_worksheet();
            sheet.set_name(&table.name)?;
            for (col, title) in (0u16..).zip(&header) {
                sheet.write_string_with_format(0, col, *title, &bold)?;
            }
            for (row, cells) in (1u32..).zip(&table.rows) {
                for (col, value) in (0u16..).zip(cells) {
                    if !value.is_empty() {
                        sheet.write_string(row, col, value)?;
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}
