//! Explicit capability registry: tool name → (parameter schema, handler).

use std::collections::HashMap;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::application::dtos::{
    AppendDocumentRequest, CreateDocumentRequest, CreateFolderRequest, CreateNoteRequest,
    CreateSpreadsheetRequest, DeleteNoteRequest, EmailThreadRequest, FileInfoRequest,
    FindNotesRequest, ListDocumentsRequest, ReadDocumentRequest, ReadSpreadsheetRequest,
    RecentEmailsRequest, SearchDocumentsRequest, SearchEmailsRequest, SendEmailRequest,
    UpdateNoteRequest, WriteSpreadsheetRequest,
};
use crate::application::services::Workspace;
use crate::domain::DomainError;

type Handler = Arc<dyn Fn(&Workspace, Value) -> Result<String, DomainError> + Send + Sync>;

/// A single named, schema-typed operation exposed to callers.
#[derive(Clone)]
pub struct Capability {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<Map<String, Value>>,
    handler: Handler,
}

impl Capability {
    /// Bind `handler` to `name`. The input schema is derived from the parameter type `P`,
    /// and arguments are decoded into `P` (defaults applied) before the handler runs.
    pub fn new<P, F>(name: &'static str, description: &'static str, handler: F) -> Self
    where
        P: DeserializeOwned + JsonSchema,
        F: Fn(&Workspace, P) -> Result<String, DomainError> + Send + Sync + 'static,
    {
        let input_schema = match serde_json::to_value(schemars::schema_for!(P)) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                map.insert("type".into(), Value::String("object".into()));
                map
            }
        };

        let handler: Handler = Arc::new(move |workspace, arguments| {
            let params = serde_json::from_value::<P>(arguments)
                .map_err(|err| DomainError::validation(format!("{name}: {err}")))?;
            handler(workspace, params)
        });

        Self {
            name,
            description,
            input_schema: Arc::new(input_schema),
            handler,
        }
    }

    pub fn invoke(&self, workspace: &Workspace, arguments: Value) -> Result<String, DomainError> {
        (self.handler)(workspace, arguments)
    }
}

/// Built once at startup and iterated by the transport host.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
    by_name: HashMap<&'static str, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. A second registration under the same name replaces the first.
    pub fn register(&mut self, capability: Capability) {
        if let Some(&slot) = self.by_name.get(capability.name) {
            warn!(target: "fusion::dispatch", tool = capability.name, "replacing registered tool");
            self.capabilities[slot] = capability;
            return;
        }
        self.by_name
            .insert(capability.name, self.capabilities.len());
        self.capabilities.push(capability);
    }

    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.by_name
            .get(name)
            .map(|&slot| &self.capabilities[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Every document, spreadsheet, drive, notes and mail tool.
    pub fn workspace_tools() -> Self {
        let mut registry = Self::new();

        registry.register(Capability::new(
            "read_google_doc",
            "Reads the content of a specific Google Document",
            |ws, p: ReadDocumentRequest| {
                ws.documents
                    .read(&p.document_id, p.format, p.tab_id.as_deref())
            },
        ));
        registry.register(Capability::new(
            "append_to_google_doc",
            "Append text to the end of a Google Document",
            |ws, p: AppendDocumentRequest| {
                ws.documents.append(
                    &p.document_id,
                    &p.text_to_append,
                    p.add_newline,
                    p.tab_id.as_deref(),
                )
            },
        ));
        registry.register(Capability::new(
            "create_document_tool",
            "Create a new Google Document",
            |ws, p: CreateDocumentRequest| {
                ws.documents.create(
                    &p.title,
                    p.parent_folder_id.as_deref(),
                    p.initial_content.as_deref(),
                )
            },
        ));

        registry.register(Capability::new(
            "read_spreadsheet_tool",
            "Read data from a specific range in a Google Spreadsheet",
            |ws, p: ReadSpreadsheetRequest| {
                ws.spreadsheets
                    .read_range(&p.spreadsheet_id, &p.range, p.value_render_option)
            },
        ));
        registry.register(Capability::new(
            "write_spreadsheet_tool",
            "Write data to a specific range in a Google Spreadsheet",
            |ws, p: WriteSpreadsheetRequest| {
                ws.spreadsheets.write_range(
                    &p.spreadsheet_id,
                    &p.range,
                    &p.values,
                    p.value_input_option,
                )
            },
        ));
        registry.register(Capability::new(
            "append_spreadsheet_rows_tool",
            "Append rows of data to the end of a sheet in a Google Spreadsheet",
            |ws, p: WriteSpreadsheetRequest| {
                ws.spreadsheets.append_rows(
                    &p.spreadsheet_id,
                    &p.range,
                    &p.values,
                    p.value_input_option,
                )
            },
        ));
        registry.register(Capability::new(
            "create_spreadsheet_tool",
            "Create a new Google Spreadsheet",
            |ws, p: CreateSpreadsheetRequest| {
                ws.spreadsheets.create(
                    &p.title,
                    p.parent_folder_id.as_deref(),
                    p.initial_data.as_deref(),
                )
            },
        ));

        registry.register(Capability::new(
            "list_google_docs",
            "List Google Documents from Google Drive",
            |ws, p: ListDocumentsRequest| {
                let max_results = p.max_results.unwrap_or(ws.default_max_results);
                ws.drive
                    .list_documents(max_results, p.query.as_deref(), &p.order_by)
            },
        ));
        registry.register(Capability::new(
            "search_google_docs",
            "Search for Google Documents by name, content, or other criteria",
            |ws, p: SearchDocumentsRequest| {
                ws.drive.search_documents(
                    &p.search_query,
                    p.search_in,
                    p.max_results,
                    p.modified_after.as_deref(),
                )
            },
        ));
        registry.register(Capability::new(
            "create_drive_folder",
            "Create a new folder in Google Drive",
            |ws, p: CreateFolderRequest| {
                ws.drive
                    .create_folder(&p.name, p.parent_folder_id.as_deref())
            },
        ));
        registry.register(Capability::new(
            "get_drive_file_info",
            "Get detailed information about a specific file in Google Drive",
            |ws, p: FileInfoRequest| ws.drive.file_info(&p.file_id),
        ));

        registry.register(Capability::new(
            "find_keep_notes",
            "Find notes based on a search query",
            |ws, p: FindNotesRequest| ws.notes.find(&p.query),
        ));
        registry.register(Capability::new(
            "create_keep_note",
            "Create a new note with title and text",
            |ws, p: CreateNoteRequest| ws.notes.create(p.title.as_deref(), p.text.as_deref()),
        ));
        registry.register(Capability::new(
            "update_keep_note",
            "Update a note's properties",
            |ws, p: UpdateNoteRequest| {
                ws.notes
                    .update(&p.note_id, p.title.as_deref(), p.text.as_deref())
            },
        ));
        registry.register(Capability::new(
            "delete_keep_note",
            "Delete a note (mark for deletion)",
            |ws, p: DeleteNoteRequest| ws.notes.delete(&p.note_id),
        ));
        registry.register(Capability::new(
            "get_pinned_keep_notes",
            "Get only pinned notes",
            |ws, p: FindNotesRequest| ws.notes.pinned(&p.query),
        ));

        registry.register(Capability::new(
            "read_recent_gmail_emails",
            "Fetches N most recent emails",
            |ws, p: RecentEmailsRequest| ws.mail.recent(p.limit),
        ));
        registry.register(Capability::new(
            "search_gmail_emails",
            "Searches emails using Gmail query syntax",
            |ws, p: SearchEmailsRequest| ws.mail.search(&p.query, p.limit),
        ));
        registry.register(Capability::new(
            "send_gmail_email",
            "Sends a new email",
            |ws, p: SendEmailRequest| {
                ws.mail
                    .send(&p.to, &p.subject, &p.body, &p.cc, &p.bcc, &p.attachments)
            },
        ));
        registry.register(Capability::new(
            "get_gmail_thread",
            "Reads full conversation history",
            |ws, p: EmailThreadRequest| ws.mail.thread(&p.thread_id),
        ));

        registry
    }
}
