//! Report naming and export targets.
//!
//! A report is a base name plus a save directory; the two derived paths
//! (CSV and XLSX) are recomputed whenever either changes, so they always
//! reflect the current settings.

use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, CsvWriter, DataFrame, SerWriter};
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::HiveError;

const DEFAULT_REPORT_NAME: &str = "report_export";

/// Export naming state: report name, save directory, derived file paths.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    name: String,
    directory: PathBuf,
    csv: PathBuf,
    xlsx: PathBuf,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPaths {
    /// Default name `report_export`, rooted at the current working directory.
    pub fn new() -> Self {
        let directory = std::env::current_dir().unwrap_or_default();
        let mut paths = ReportPaths {
            name: DEFAULT_REPORT_NAME.to_string(),
            directory,
            csv: PathBuf::new(),
            xlsx: PathBuf::new(),
        };
        paths.recompute();
        paths
    }

    fn recompute(&mut self) {
        self.csv = self.directory.join(format!("{}.csv", self.name));
        self.xlsx = self.directory.join(format!("{}.xlsx", self.name));
    }

    /// Set the report name and recompute both derived paths. An empty name
    /// is rejected: the rejection is logged and all state is left unchanged.
    /// Returns whether the name was accepted.
    pub fn set_name(&mut self, name: &str) -> bool {
        if name.is_empty() {
            info!("report name was blank; keeping {:?}", self.name);
            return false;
        }
        self.name = name.to_string();
        self.recompute();
        true
    }

    /// Set the save directory and recompute both derived paths.
    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
        self.recompute();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv
    }

    pub fn xlsx_path(&self) -> &Path {
        &self.xlsx
    }

    /// Write the frame to the CSV path, header included.
    pub fn write_csv(&self, df: &mut DataFrame) -> Result<(), HiveError> {
        let mut file = std::fs::File::create(&self.csv)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| HiveError::Export(e.to_string()))?;
        Ok(())
    }

    /// Write the frame to the XLSX path: header row, then cells typed as
    /// number, boolean, or string. Nulls become blank cells.
    pub fn write_xlsx(&self, df: &DataFrame) -> Result<(), HiveError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in df.get_column_names().iter().enumerate() {
            sheet.write_string(0, col as u16, *name)?;
        }
        for (col, series) in df.get_columns().iter().enumerate() {
            for row in 0..series.len() {
                let cell = (row + 1) as u32;
                match series.get(row)? {
                    AnyValue::Null => {}
                    AnyValue::Boolean(b) => {
                        sheet.write_boolean(cell, col as u16, b)?;
                    }
                    AnyValue::Int8(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::Int16(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::Int32(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::Int64(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::UInt8(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::UInt16(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::UInt32(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::UInt64(v) => {
                        sheet.write_number(cell, col as u16, v as f64)?;
                    }
                    AnyValue::Float32(v) => {
                        sheet.write_number(cell, col as u16, f64::from(v))?;
                    }
                    AnyValue::Float64(v) => {
                        sheet.write_number(cell, col as u16, v)?;
                    }
                    AnyValue::String(s) => {
                        sheet.write_string(cell, col as u16, s)?;
                    }
                    AnyValue::StringOwned(s) => {
                        sheet.write_string(cell, col as u16, s.as_str())?;
                    }
                    other => {
                        sheet.write_string(cell, col as u16, &other.to_string())?;
                    }
                }
            }
        }
        workbook.save(&self.xlsx)?;
        Ok(())
    }
}
