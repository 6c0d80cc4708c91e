use std::sync::Arc;

use serde_json::Value;

use super::{required, DriveApi, SheetsApi};
use crate::domain::{DomainError, UpdatedCells, ValueInputOption, ValueRenderOption};

/// Range-level reads and writes plus spreadsheet creation.
#[derive(Clone)]
pub struct SpreadsheetService {
    sheets: Arc<dyn SheetsApi>,
    drive: Arc<dyn DriveApi>,
}

impl SpreadsheetService {
    pub fn new(sheets: Arc<dyn SheetsApi>, drive: Arc<dyn DriveApi>) -> Self {
        Self { sheets, drive }
    }

    pub fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<String, DomainError> {
        let spreadsheet_id = required(spreadsheet_id, "spreadsheet_id")?;
        required(range, "range")?;
        let result = self.sheets.get_values(spreadsheet_id, range, render)?;

        if result.values.is_empty() {
            return Ok(format!("No data found in range {range}."));
        }

        let mut out = format!("Range: {}\n", result.range.as_deref().unwrap_or(range));
        for row in &result.values {
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        Ok(out)
    }

    pub fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<String, DomainError> {
        let spreadsheet_id = required(spreadsheet_id, "spreadsheet_id")?;
        required(range, "range")?;
        let updated = self
            .sheets
            .update_values(spreadsheet_id, range, values, input)?;
        Ok(format!(
            "Updated {} cell(s) in {}",
            updated.updated_cells,
            updated_range(&updated, range)
        ))
    }

    pub fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<String, DomainError> {
        let spreadsheet_id = required(spreadsheet_id, "spreadsheet_id")?;
        required(range, "range")?;
        let updated = self
            .sheets
            .append_values(spreadsheet_id, range, values, input)?;
        Ok(format!(
            "Appended {} row(s) ({} cell(s)) to {}",
            updated.updated_rows,
            updated.updated_cells,
            updated_range(&updated, range)
        ))
    }

    pub fn create(
        &self,
        title: &str,
        parent_folder_id: Option<&str>,
        initial_data: Option<&[Vec<Value>]>,
    ) -> Result<String, DomainError> {
        let title = required(title, "title")?;
        let created = self.sheets.create_spreadsheet(title)?;
        let spreadsheet_id = created.spreadsheet_id.as_str();

        if let Some(folder_id) = parent_folder_id
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
        {
            self.drive.move_to_folder(spreadsheet_id, folder_id)?;
        }

        if let Some(rows) = initial_data.filter(|rows| !rows.is_empty()) {
            let sheet = created.first_sheet_title.as_deref().unwrap_or("Sheet1");
            let anchor = format!("'{}'!A1", sheet.replace('\'', "''"));
            self.sheets
                .update_values(spreadsheet_id, &anchor, rows, ValueInputOption::UserEntered)?;
        }

        let url = created.spreadsheet_url.clone().unwrap_or_else(|| {
            format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
        });
        Ok(format!(
            "Created spreadsheet '{title}' with ID: {spreadsheet_id}\nURL: {url}"
        ))
    }
}

fn updated_range<'a>(updated: &'a UpdatedCells, fallback: &'a str) -> &'a str {
    updated.updated_range.as_deref().unwrap_or(fallback)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
