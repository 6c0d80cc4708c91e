//! Adapters translating tool calls into provider API calls, plus the provider
//! contracts they are built on.

mod documents;
mod drive;
mod mail;
mod notes;
mod spreadsheets;

#[cfg(test)]
pub(crate) mod fakes;

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    CreatedSpreadsheet, DomainError, DriveFile, FileListQuery, MailMessage, MailThread,
    MessageRef, NewFile, Note, OutgoingMessage, TextInsertion, UpdatedCells, ValueInputOption,
    ValueRange, ValueRenderOption,
};

pub use documents::DocumentService;
pub use drive::{DriveService, DOCUMENT_MIME_TYPE, FOLDER_MIME_TYPE};
pub use mail::MailService;
pub use notes::NoteService;
pub use spreadsheets::SpreadsheetService;

/// Contract for the remote documents API.
pub trait DocsApi: Send + Sync {
    /// Fetch the raw document resource. `include_tabs` asks for per-tab content.
    fn get_document(&self, document_id: &str, include_tabs: bool) -> Result<Value, DomainError>;

    /// Create an empty document and return its ID.
    fn create_document(&self, title: &str) -> Result<String, DomainError>;

    fn insert_text(&self, document_id: &str, insertion: &TextInsertion)
        -> Result<(), DomainError>;
}

/// Contract for the remote spreadsheets API.
pub trait SheetsApi: Send + Sync {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange, DomainError>;

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError>;

    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError>;

    fn create_spreadsheet(&self, title: &str) -> Result<CreatedSpreadsheet, DomainError>;
}

/// Contract for the remote file storage API.
pub trait DriveApi: Send + Sync {
    fn list_files(&self, query: &FileListQuery) -> Result<Vec<DriveFile>, DomainError>;

    fn create_file(&self, file: &NewFile) -> Result<DriveFile, DomainError>;

    fn get_file(&self, file_id: &str) -> Result<DriveFile, DomainError>;

    /// Re-parent a file into `folder_id`, detaching it from its current parents.
    fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<(), DomainError>;
}

/// Contract for the remote notes API. Notes cannot be edited in place.
pub trait NotesApi: Send + Sync {
    fn list_notes(&self) -> Result<Vec<Note>, DomainError>;

    fn get_note(&self, note_id: &str) -> Result<Note, DomainError>;

    fn create_note(&self, title: &str, text: &str) -> Result<Note, DomainError>;

    fn delete_note(&self, note_id: &str) -> Result<(), DomainError>;
}

/// Contract for the remote mail API.
pub trait MailApi: Send + Sync {
    fn list_messages(
        &self,
        query: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, DomainError>;

    fn get_message(&self, message_id: &str) -> Result<MailMessage, DomainError>;

    fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, DomainError>;

    fn get_thread(&self, thread_id: &str) -> Result<MailThread, DomainError>;
}

/// Every adapter the registry can dispatch into, constructed once at startup.
#[derive(Clone)]
pub struct Workspace {
    pub documents: DocumentService,
    pub spreadsheets: SpreadsheetService,
    pub drive: DriveService,
    pub notes: NoteService,
    pub mail: MailService,
    pub default_max_results: u32,
}

impl Workspace {
    pub fn new(
        docs: Arc<dyn DocsApi>,
        sheets: Arc<dyn SheetsApi>,
        drive: Arc<dyn DriveApi>,
        notes: Arc<dyn NotesApi>,
        mail: Arc<dyn MailApi>,
        default_max_results: u32,
    ) -> Self {
        Self {
            documents: DocumentService::new(docs, Arc::clone(&drive)),
            spreadsheets: SpreadsheetService::new(sheets, Arc::clone(&drive)),
            drive: DriveService::new(drive),
            notes: NoteService::new(notes),
            mail: MailService::new(mail),
            default_max_results: default_max_results.max(1),
        }
    }
}

/// Reject blank identifiers before any provider call is made. Returns the trimmed value;
/// ranges and queries are validated here but forwarded as given.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}
