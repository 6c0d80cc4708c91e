use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{segment, GoogleClient};
use crate::application::services::SheetsApi;
use crate::domain::{
    CreatedSpreadsheet, DomainError, UpdatedCells, ValueInputOption, ValueRange,
    ValueRenderOption,
};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4";

pub struct GoogleSheetsClient {
    client: Arc<GoogleClient>,
}

impl GoogleSheetsClient {
    pub fn new(client: Arc<GoogleClient>) -> Self {
        Self { client }
    }

    fn values_url(spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{SHEETS_API}/spreadsheets/{}/values/{}",
            segment(spreadsheet_id),
            segment(range)
        )
    }
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: UpdatedCells,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    spreadsheet_id: String,
    #[serde(default)]
    spreadsheet_url: Option<String>,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    #[serde(default)]
    properties: SheetProperties,
}

#[derive(Debug, Default, Deserialize)]
struct SheetProperties {
    #[serde(default)]
    title: Option<String>,
}

fn values_body(range: &str, values: &[Vec<Value>]) -> Value {
    json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": values,
    })
}

impl SheetsApi for GoogleSheetsClient {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange, DomainError> {
        self.client.get_json(
            &Self::values_url(spreadsheet_id, range),
            &[("valueRenderOption", render.as_str())],
        )
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError> {
        self.client.send_json(
            "PUT",
            &Self::values_url(spreadsheet_id, range),
            &[("valueInputOption", input.as_str())],
            &values_body(range, values),
        )
    }

    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError> {
        let response: AppendResponse = self.client.send_json(
            "POST",
            &format!("{}:append", Self::values_url(spreadsheet_id, range)),
            &[
                ("valueInputOption", input.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ],
            &values_body(range, values),
        )?;
        Ok(response.updates)
    }

    fn create_spreadsheet(&self, title: &str) -> Result<CreatedSpreadsheet, DomainError> {
        let created: SpreadsheetResource = self.client.send_json(
            "POST",
            &format!("{SHEETS_API}/spreadsheets"),
            &[],
            &json!({ "properties": { "title": title } }),
        )?;

        Ok(CreatedSpreadsheet {
            first_sheet_title: created
                .sheets
                .into_iter()
                .next()
                .and_then(|sheet| sheet.properties.title),
            spreadsheet_id: created.spreadsheet_id,
            spreadsheet_url: created.spreadsheet_url,
        })
    }
}
