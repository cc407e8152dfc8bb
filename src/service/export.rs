//! CSV and XLSX downloads of tabular results

use rust_xlsxwriter::{ColNum, RowNum, Workbook, XlsxError};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::model::{Cell, TabularRow};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(String),

    #[error("Spreadsheet encoding failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Too many rows for a worksheet: {0}")]
    TooManyRows(usize),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// An encoded download
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode `rows` as `{stem}.{ext}`; `sheet` names the worksheet in XLSX output
pub fn export<R: TabularRow>(
    rows: &[R],
    format: ExportFormat,
    stem: &str,
    sheet: &str,
) -> Result<Export, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => to_csv(rows)?,
        ExportFormat::Xlsx => to_xlsx(rows, sheet)?,
    };

    tracing::debug!(rows = rows.len(), format = format.extension(), bytes = bytes.len(), "Encoded export");

    Ok(Export {
        filename: format!("{}.{}", stem, format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

pub fn to_csv<R: TabularRow>(rows: &[R]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(R::headers())?;
    for row in rows {
        writer.write_record(row.cells().iter().map(Cell::to_string))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

pub fn to_xlsx<R: TabularRow>(rows: &[R], sheet: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet)?;

        for (col, header) in R::headers().iter().enumerate() {
            worksheet.write_string(0, column(col)?, *header)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let row_num =
                RowNum::try_from(index + 1).map_err(|_| ExportError::TooManyRows(rows.len()))?;
            for (col, cell) in row.cells().into_iter().enumerate() {
                let col = column(col)?;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(row_num, col, s)?;
                    }
                    Cell::Integer(n) => {
                        worksheet.write_number(row_num, col, n as f64)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(row_num, col, n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(row_num, col, b)?;
                    }
                    Cell::Date(d) => {
                        worksheet.write_string(row_num, col, d.format("%Y-%m-%d").to_string())?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(index: usize) -> Result<ColNum, ExportError> {
    ColNum::try_from(index).map_err(|_| ExportError::TooManyRows(index))
}
