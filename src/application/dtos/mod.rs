//! Typed parameter contracts for every exposed tool.
//!
//! Each struct is decoded from the caller's argument object at the dispatch
//! boundary. Serde defaults are the single place optional parameters receive
//! their documented values, and `deny_unknown_fields` turns stray parameter
//! names into validation errors instead of silently dropping them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DocumentFormat, SearchScope, ValueInputOption, ValueRenderOption};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadDocumentRequest {
    /// The ID of the Google Document
    pub document_id: String,
    /// Output format: 'text', 'json', or 'markdown'
    #[serde(default)]
    pub format: DocumentFormat,
    /// The ID of the specific tab to read
    #[serde(default)]
    pub tab_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AppendDocumentRequest {
    /// The ID of the Google Document
    pub document_id: String,
    /// The text to append
    pub text_to_append: String,
    /// Whether to add a newline before appending
    #[serde(default = "default_true")]
    pub add_newline: bool,
    /// The ID of the specific tab to append to
    #[serde(default)]
    pub tab_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDocumentRequest {
    /// Title for the new document
    pub title: String,
    /// ID of folder where document should be created
    #[serde(default)]
    pub parent_folder_id: Option<String>,
    /// Initial text content to add to the document
    #[serde(default)]
    pub initial_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadSpreadsheetRequest {
    /// The ID of the Google Spreadsheet
    pub spreadsheet_id: String,
    /// A1 notation range to read
    pub range: String,
    /// How values should be rendered in the output
    #[serde(default)]
    pub value_render_option: ValueRenderOption,
}

/// Shared by the write and append-rows tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WriteSpreadsheetRequest {
    /// The ID of the Google Spreadsheet
    pub spreadsheet_id: String,
    /// A1 notation range to write to
    pub range: String,
    /// 2D array of values to write
    pub values: Vec<Vec<Value>>,
    /// How input data should be interpreted
    #[serde(default)]
    pub value_input_option: ValueInputOption,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSpreadsheetRequest {
    /// Title for the new spreadsheet
    pub title: String,
    /// ID of folder where spreadsheet should be created
    #[serde(default)]
    pub parent_folder_id: Option<String>,
    /// Initial data to populate in the first sheet
    #[serde(default)]
    pub initial_data: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDocumentsRequest {
    /// Maximum number of documents to return (server default when omitted)
    #[serde(default)]
    pub max_results: Option<u32>,
    /// Search query to filter documents
    #[serde(default)]
    pub query: Option<String>,
    /// Sort order for results
    #[serde(default = "default_order_by")]
    pub order_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchDocumentsRequest {
    /// Search term to find in document names or content
    pub search_query: String,
    /// Where to search: 'name', 'content', or 'both'
    #[serde(default)]
    pub search_in: SearchScope,
    /// Maximum number of results to return
    #[serde(default = "default_page_limit")]
    pub max_results: u32,
    /// Only return documents modified after this date (RFC 3339)
    #[serde(default)]
    pub modified_after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateFolderRequest {
    /// Name for the new folder
    pub name: String,
    /// Parent folder ID
    #[serde(default)]
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FileInfoRequest {
    /// ID of the file to get information about
    pub file_id: String,
}

/// Shared by the find and pinned note tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FindNotesRequest {
    /// A string to match against the title and text
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
    /// The title of the note
    #[serde(default)]
    pub title: Option<String>,
    /// The content of the note
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoteRequest {
    /// The ID of the note to update
    pub note_id: String,
    /// New title for the note
    #[serde(default)]
    pub title: Option<String>,
    /// New text content for the note
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteNoteRequest {
    /// The ID of the note to delete
    pub note_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecentEmailsRequest {
    /// Number of recent emails to fetch
    #[serde(default = "default_page_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchEmailsRequest {
    /// Gmail search query
    pub query: String,
    /// Maximum number of results
    #[serde(default = "default_page_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SendEmailRequest {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Email body
    pub body: String,
    /// CC recipients
    #[serde(default)]
    pub cc: String,
    /// BCC recipients
    #[serde(default)]
    pub bcc: String,
    /// File paths to attach
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EmailThreadRequest {
    /// Thread ID to read
    pub thread_id: String,
}

const fn default_true() -> bool {
    true
}

const fn default_page_limit() -> u32 {
    10
}

fn default_order_by() -> String {
    "modifiedTime".to_string()
}
