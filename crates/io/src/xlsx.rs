// Excel import (first worksheet) and report workbook export

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};

use taxmatch_recon::{ExportSheet, ReconError, Value};

/// Import the first worksheet of an Excel/ODS file. The first row of the
/// used range is the header.
pub fn import_bytes(source: &str, bytes: &[u8]) -> Result<taxmatch_recon::Table, ReconError> {
    let unparseable = |message: String| ReconError::Unparseable {
        source: source.into(),
        message,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| unparseable(format!("Failed to open Excel file: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| unparseable("Excel file contains no sheets".into()))?
        .map_err(|e| unparseable(format!("Failed to read first sheet: {e}")))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| unparseable("first sheet is empty".into()))?;

    let raw: Vec<String> = header.iter().map(|cell| cell_value(cell).to_string()).collect();
    let mut table = taxmatch_recon::Table::new(crate::header_names(raw.iter().map(String::as_str)));

    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_value).collect();
        if values.iter().all(Value::is_empty) {
            continue;
        }
        table.push_row(values);
    }

    log::debug!("'{source}': {} row(s) from first sheet", table.len());
    Ok(table)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) if s.is_empty() => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Bool(b) => Value::Bool(*b),
        // Serial kept; the variant remembers it was formatted as a date
        Data::DateTime(dt) => Value::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(format!("#{e:?}")),
    }
}

/// Serialize sheets into an in-memory `.xlsx`, one worksheet per entry.
///
/// Each sheet gets a bold header row (all joined columns, then the
/// provenance column if configured) followed by one row per partition row.
pub fn write_workbook(sheets: &[ExportSheet<'_>]) -> Result<Vec<u8>, ReconError> {
    let mut workbook = XlsxWorkbook::new();
    let formats = CellFormats::new();

    for sheet in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| export_err(&sheet.name, e))?;
        write_sheet(worksheet, sheet, &formats).map_err(|e| export_err(&sheet.name, e))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ReconError::Export(format!("Failed to save XLSX workbook: {e}")))
}

fn export_err(sheet: &str, e: XlsxError) -> ReconError {
    ReconError::Export(format!("sheet '{sheet}': {e}"))
}

/// Formats shared by every sheet of one workbook.
struct CellFormats {
    header: Format,
    date: Format,
    datetime: Format,
    time: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
            time: Format::new().set_num_format("hh:mm:ss"),
        }
    }

    /// Same split as the import side: whole serials are dates, serials
    /// below one are times of day, anything else is a date with a time.
    fn for_serial(&self, serial: f64) -> &Format {
        if serial.fract() == 0.0 {
            &self.date
        } else if serial.trunc() == 0.0 {
            &self.time
        } else {
            &self.datetime
        }
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &ExportSheet<'_>, formats: &CellFormats) -> Result<(), XlsxError> {
    let header = &formats.header;
    let columns = sheet.partition.columns();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, header)?;
    }
    if let Some(ref indicator) = sheet.indicator_column {
        worksheet.write_string_with_format(0, columns.len() as u16, indicator, header)?;
    }

    for (i, row) in sheet.partition.rows().enumerate() {
        // rust_xlsxwriter uses 0-based row/col as u32/u16
        let row32 = (i + 1) as u32;
        for (col, value) in row.values.iter().enumerate() {
            write_value(worksheet, row32, col as u16, value, formats)?;
        }
        if sheet.indicator_column.is_some() {
            worksheet.write_string(row32, columns.len() as u16, row.provenance.as_str())?;
        }
    }
    Ok(())
}

fn write_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    formats: &CellFormats,
) -> Result<(), XlsxError> {
    match value {
        Value::Empty => {}
        Value::Text(s) if s.is_empty() => {}
        Value::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Value::Number(n) if n.is_finite() => {
            worksheet.write_number(row, col, *n)?;
        }
        Value::Number(n) => {
            worksheet.write_string(row, col, n.to_string())?;
        }
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Date(serial) if serial.is_finite() => {
            worksheet.write_number_with_format(row, col, *serial, formats.for_serial(*serial))?;
        }
        Value::Date(serial) => {
            worksheet.write_string(row, col, serial.to_string())?;
        }
    }
    Ok(())
}
