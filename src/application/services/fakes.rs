//! In-memory provider doubles that record every call for assertions.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use super::{DocsApi, DriveApi, MailApi, NotesApi, SheetsApi, Workspace};
use crate::domain::{
    CreatedSpreadsheet, DomainError, DriveFile, FileListQuery, MailMessage, MailThread,
    MessageRef, NewFile, Note, OutgoingMessage, TextInsertion, UpdatedCells, ValueInputOption,
    ValueRange, ValueRenderOption,
};

/// When set, every call on the fake fails with `NotFound` carrying this message.
#[derive(Default)]
pub struct Failure(Mutex<Option<String>>);

impl Failure {
    pub fn set(&self, message: &str) {
        *self.0.lock() = Some(message.to_string());
    }

    fn check(&self) -> Result<(), DomainError> {
        match self.0.lock().as_ref() {
            Some(message) => Err(DomainError::not_found(message.clone())),
            None => Ok(()),
        }
    }
}

pub struct FakeDocs {
    pub document: Mutex<Value>,
    pub fetches: Mutex<Vec<(String, bool)>>,
    pub insertions: Mutex<Vec<(String, TextInsertion)>>,
    pub created: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl Default for FakeDocs {
    fn default() -> Self {
        Self {
            document: Mutex::new(json!({
                "documentId": "doc1",
                "title": "Plan",
                "body": { "content": [
                    { "endIndex": 1, "sectionBreak": {} },
                    { "startIndex": 1, "endIndex": 13, "paragraph": { "elements": [
                        { "textRun": { "content": "Hello world\n" } }
                    ] } }
                ] }
            })),
            fetches: Mutex::default(),
            insertions: Mutex::default(),
            created: Mutex::default(),
            failure: Failure::default(),
        }
    }
}

impl DocsApi for FakeDocs {
    fn get_document(&self, document_id: &str, include_tabs: bool) -> Result<Value, DomainError> {
        self.failure.check()?;
        self.fetches.lock().push((document_id.to_string(), include_tabs));
        Ok(self.document.lock().clone())
    }

    fn create_document(&self, title: &str) -> Result<String, DomainError> {
        self.failure.check()?;
        self.created.lock().push(title.to_string());
        Ok("new-doc".to_string())
    }

    fn insert_text(
        &self,
        document_id: &str,
        insertion: &TextInsertion,
    ) -> Result<(), DomainError> {
        self.failure.check()?;
        self.insertions
            .lock()
            .push((document_id.to_string(), insertion.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuesCall {
    pub spreadsheet_id: String,
    pub range: String,
    pub values: Vec<Vec<Value>>,
    pub input: ValueInputOption,
}

#[derive(Default)]
pub struct FakeSheets {
    pub values: Mutex<ValueRange>,
    pub reads: Mutex<Vec<(String, String, ValueRenderOption)>>,
    pub updates: Mutex<Vec<ValuesCall>>,
    pub appends: Mutex<Vec<ValuesCall>>,
    pub created: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl SheetsApi for FakeSheets {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange, DomainError> {
        self.failure.check()?;
        self.reads
            .lock()
            .push((spreadsheet_id.to_string(), range.to_string(), render));
        Ok(self.values.lock().clone())
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError> {
        self.failure.check()?;
        self.updates.lock().push(ValuesCall {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values: values.to_vec(),
            input,
        });
        Ok(updated(range, values))
    }

    fn append_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<Value>],
        input: ValueInputOption,
    ) -> Result<UpdatedCells, DomainError> {
        self.failure.check()?;
        self.appends.lock().push(ValuesCall {
            spreadsheet_id: spreadsheet_id.to_string(),
            range: range.to_string(),
            values: values.to_vec(),
            input,
        });
        Ok(updated(range, values))
    }

    fn create_spreadsheet(&self, title: &str) -> Result<CreatedSpreadsheet, DomainError> {
        self.failure.check()?;
        self.created.lock().push(title.to_string());
        Ok(CreatedSpreadsheet {
            spreadsheet_id: "new-sheet".into(),
            spreadsheet_url: Some("https://docs.google.com/spreadsheets/d/new-sheet".into()),
            first_sheet_title: Some("Sheet1".into()),
        })
    }
}

fn updated(range: &str, values: &[Vec<Value>]) -> UpdatedCells {
    UpdatedCells {
        updated_range: Some(range.to_string()),
        updated_rows: values.len() as u64,
        updated_columns: values.iter().map(Vec::len).max().unwrap_or(0) as u64,
        updated_cells: values.iter().map(Vec::len).sum::<usize>() as u64,
    }
}

#[derive(Default)]
pub struct FakeDrive {
    pub files: Mutex<Vec<DriveFile>>,
    pub queries: Mutex<Vec<FileListQuery>>,
    pub created: Mutex<Vec<NewFile>>,
    pub moves: Mutex<Vec<(String, String)>>,
    pub failure: Failure,
}

impl DriveApi for FakeDrive {
    fn list_files(&self, query: &FileListQuery) -> Result<Vec<DriveFile>, DomainError> {
        self.failure.check()?;
        self.queries.lock().push(query.clone());
        let files = self.files.lock();
        Ok(files
            .iter()
            .take(query.page_size as usize)
            .cloned()
            .collect())
    }

    fn create_file(&self, file: &NewFile) -> Result<DriveFile, DomainError> {
        self.failure.check()?;
        self.created.lock().push(file.clone());
        Ok(DriveFile {
            id: "new-folder".into(),
            name: file.name.clone(),
            mime_type: Some(file.mime_type.clone()),
            ..DriveFile::default()
        })
    }

    fn get_file(&self, file_id: &str) -> Result<DriveFile, DomainError> {
        self.failure.check()?;
        self.files
            .lock()
            .iter()
            .find(|file| file.id == file_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("File not found: {file_id}")))
    }

    fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<(), DomainError> {
        self.failure.check()?;
        self.moves
            .lock()
            .push((file_id.to_string(), folder_id.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotes {
    pub notes: Mutex<Vec<Note>>,
    pub deleted: Mutex<Vec<String>>,
    pub failure: Failure,
}

impl NotesApi for FakeNotes {
    fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        self.failure.check()?;
        Ok(self.notes.lock().clone())
    }

    fn create_note(&self, title: &str, text: &str) -> Result<Note, DomainError> {
        self.failure.check()?;
        let mut notes = self.notes.lock();
        let issued = notes.len() + self.deleted.lock().len();
        let note = Note {
            id: format!("notes/{}", issued + 1),
            title: title.to_string(),
            text: text.to_string(),
            ..Note::default()
        };
        notes.push(note.clone());
        Ok(note)
    }

    fn get_note(&self, note_id: &str) -> Result<Note, DomainError> {
        self.failure.check()?;
        self.notes
            .lock()
            .iter()
            .find(|note| note.id == note_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Note not found: {note_id}")))
    }

    fn delete_note(&self, note_id: &str) -> Result<(), DomainError> {
        self.failure.check()?;
        self.notes.lock().retain(|note| note.id != note_id);
        self.deleted.lock().push(note_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMail {
    pub messages: Mutex<Vec<MailMessage>>,
    pub listings: Mutex<Vec<(Option<String>, u32)>>,
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub failure: Failure,
}

impl MailApi for FakeMail {
    fn list_messages(
        &self,
        query: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, DomainError> {
        self.failure.check()?;
        self.listings
            .lock()
            .push((query.map(str::to_string), max_results));
        Ok(self
            .messages
            .lock()
            .iter()
            .take(max_results as usize)
            .map(|message| MessageRef {
                id: message.id.clone(),
                thread_id: message.thread_id.clone(),
            })
            .collect())
    }

    fn get_message(&self, message_id: &str) -> Result<MailMessage, DomainError> {
        self.failure.check()?;
        self.messages
            .lock()
            .iter()
            .find(|message| message.id == message_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("Message not found: {message_id}")))
    }

    fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, DomainError> {
        self.failure.check()?;
        self.sent.lock().push(message.clone());
        Ok(MessageRef {
            id: "sent-1".into(),
            thread_id: "thread-sent-1".into(),
        })
    }

    fn get_thread(&self, thread_id: &str) -> Result<MailThread, DomainError> {
        self.failure.check()?;
        let messages: Vec<MailMessage> = self
            .messages
            .lock()
            .iter()
            .filter(|message| message.thread_id == thread_id)
            .cloned()
            .collect();
        if messages.is_empty() {
            return Err(DomainError::not_found(format!(
                "Thread not found: {thread_id}"
            )));
        }
        Ok(MailThread {
            id: thread_id.to_string(),
            messages,
        })
    }
}

/// All five fakes plus a workspace wired to them.
pub struct FakeProviders {
    pub docs: Arc<FakeDocs>,
    pub sheets: Arc<FakeSheets>,
    pub drive: Arc<FakeDrive>,
    pub notes: Arc<FakeNotes>,
    pub mail: Arc<FakeMail>,
}

impl FakeProviders {
    pub fn new() -> Self {
        Self {
            docs: Arc::new(FakeDocs::default()),
            sheets: Arc::new(FakeSheets::default()),
            drive: Arc::new(FakeDrive::default()),
            notes: Arc::new(FakeNotes::default()),
            mail: Arc::new(FakeMail::default()),
        }
    }

    pub fn workspace(&self, default_max_results: u32) -> Workspace {
        Workspace::new(
            self.docs.clone(),
            self.sheets.clone(),
            self.drive.clone(),
            self.notes.clone(),
            self.mail.clone(),
            default_max_results,
        )
    }

    pub fn fail_all(&self, message: &str) {
        self.docs.failure.set(message);
        self.sheets.failure.set(message);
        self.drive.failure.set(message);
        self.notes.failure.set(message);
        self.mail.failure.set(message);
    }
}
