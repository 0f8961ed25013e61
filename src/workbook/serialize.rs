//! Writing the sheet model out as xlsx or delimited text.

use log::warn;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use super::sheets::{Cell, Sheet};
use crate::{models::Branding, Result};

/// Width applied to every used column.
pub const COLUMN_WIDTH: f64 = 18.0;

/// Most characters Excel accepts in one cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Cut text down to what one xlsx cell can hold.
pub fn fit_cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                "Truncating cell text of {} characters to {}",
                text.chars().count(),
                MAX_CELL_CHARS
            );
            &text[..cut]
        }
        None => text,
    }
}

/// Formats shared by every sheet of one workbook.
struct Styles {
    title: Format,
    header: Format,
    text: Format,
    text_band: Format,
    number: Format,
    number_band: Format,
    integer: Format,
    integer_band: Format,
}

impl Styles {
    fn new(branding: &Branding, banding: bool) -> Self {
        let base = Format::new().set_border(FormatBorder::Thin);
        let band = |f: Format| {
            if banding {
                f.set_background_color(branding.secondary_color.as_str())
            } else {
                f
            }
        };
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(13)
                .set_font_color(branding.primary_color.as_str()),
            header: base
                .clone()
                .set_bold()
                .set_font_color("#FFFFFF")
                .set_background_color(branding.primary_color.as_str()),
            text: base.clone(),
            text_band: band(base.clone()),
            number: base.clone().set_num_format("0.0"),
            number_band: band(base.clone().set_num_format("0.0")),
            integer: base.clone().set_num_format("0"),
            integer_band: band(base.set_num_format("0")),
        }
    }
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    styles: &Styles,
    band: bool,
) -> Result<()> {
    match cell {
        Cell::Text(s) => {
            let f = if band { &styles.text_band } else { &styles.text };
            ws.write_string_with_format(row, col, fit_cell_text(s), f)?;
        }
        Cell::Number(n) => {
            let f = if band { &styles.number_band } else { &styles.number };
            ws.write_number_with_format(row, col, *n, f)?;
        }
        Cell::Integer(n) => {
            let f = if band { &styles.integer_band } else { &styles.integer };
            ws.write_number_with_format(row, col, *n as f64, f)?;
        }
        Cell::Empty => {
            let f = if band { &styles.text_band } else { &styles.text };
            ws.write_blank(row, col, f)?;
        }
    }
    Ok(())
}

fn write_sheet(ws: &mut Worksheet, sheet: &Sheet, styles: &Styles) -> Result<()> {
    ws.set_name(&sheet.name)?;
    let mut widest = 0;
    for table in &sheet.tables {
        widest = widest.max(table.width());
        if let Some(title) = &table.title {
            ws.write_string_with_format(table.origin_row, 0, fit_cell_text(title), &styles.title)?;
        }
        let header_row = table.header_row();
        for (col, header) in table.headers.iter().enumerate() {
            ws.write_string_with_format(
                header_row,
                col as u16,
                fit_cell_text(header),
                &styles.header,
            )?;
        }
        for (i, row) in table.rows.iter().enumerate() {
            let r = header_row + 1 + i as u32;
            for (col, cell) in row.iter().enumerate() {
                write_cell(ws, r, col as u16, cell, styles, i % 2 == 1)?;
            }
        }
    }
    for col in 0..widest {
        ws.set_column_width(col as u16, COLUMN_WIDTH)?;
    }
    if let Some(first) = sheet.tables.first().filter(|_| sheet.autofilter) {
        let last_col = first.headers.len().saturating_sub(1) as u16;
        ws.autofilter(first.header_row(), 0, first.last_row(), last_col)?;
    }
    Ok(())
}

/// Full workbook, one worksheet per sheet.
pub fn to_xlsx(sheets: &[Sheet], branding: &Branding, banding: bool) -> Result<Vec<u8>> {
    let styles = Styles::new(branding, banding);
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let ws = workbook.add_worksheet();
        write_sheet(ws, sheet, &styles)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// Delimited text of the first sheet only.
pub fn to_delimited(sheets: &[Sheet], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());
    if let Some(sheet) = sheets.first() {
        for row in sheet.grid() {
            let record: Vec<String> = row.iter().map(Cell::display).collect();
            writer.write_record(&record)?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error().into())
}
