use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output rendering requested for a document read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// How spreadsheet cell values are rendered on read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueRenderOption {
    #[default]
    FormattedValue,
    UnformattedValue,
    Formula,
}

impl ValueRenderOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormattedValue => "FORMATTED_VALUE",
            Self::UnformattedValue => "UNFORMATTED_VALUE",
            Self::Formula => "FORMULA",
        }
    }
}

/// How written spreadsheet values are interpreted by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    Raw,
    #[default]
    UserEntered,
}

impl ValueInputOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// Where a document search looks for the query term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Name,
    Content,
    #[default]
    Both,
}

/// A single text insertion sent to the documents provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInsertion {
    pub text: String,
    pub index: i64,
    pub tab_id: Option<String>,
}

/// Query forwarded to the file storage listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListQuery {
    pub q: String,
    pub page_size: u32,
    pub order_by: Option<String>,
}

/// New file or folder metadata for the file storage provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub mime_type: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOwner {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// Projection of a Drive file resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owners: Vec<FileOwner>,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Cell grid returned by a spreadsheet read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Write statistics reported for an update or append.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCells {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u64,
    #[serde(default)]
    pub updated_columns: u64,
    #[serde(default)]
    pub updated_cells: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
    pub spreadsheet_url: Option<String>,
    pub first_sheet_title: Option<String>,
}

/// Projection of a note resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub text: String,
    /// `None` when the provider does not report pin state.
    pub pinned: Option<bool>,
    pub trashed: bool,
}

impl Note {
    /// Case-insensitive match against title and text. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle) || self.text.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageRef {
    pub id: String,
    pub thread_id: String,
}

/// Decoded mail message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailMessage {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailThread {
    pub id: String,
    pub messages: Vec<MailMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Message handed to the mail provider for delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_matches_title_or_text_case_insensitively() {
        let note = Note {
            id: "notes/1".into(),
            title: "Groceries".into(),
            text: "Milk and EGGS".into(),
            ..Note::default()
        };
        assert!(note.matches(""));
        assert!(note.matches("grocer"));
        assert!(note.matches("eggs"));
        assert!(!note.matches("bread"));
    }

    #[test]
    fn test_option_enums_use_provider_spelling() {
        let render: ValueRenderOption = serde_json::from_str("\"UNFORMATTED_VALUE\"").unwrap();
        assert_eq!(render.as_str(), "UNFORMATTED_VALUE");
        let input: ValueInputOption = serde_json::from_str("\"RAW\"").unwrap();
        assert_eq!(input.as_str(), "RAW");
        assert_eq!(ValueInputOption::default().as_str(), "USER_ENTERED");
        assert!(serde_json::from_str::<DocumentFormat>("\"html\"").is_err());
    }
}
