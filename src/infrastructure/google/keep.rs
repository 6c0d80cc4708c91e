use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{segment, GoogleClient};
use crate::application::services::NotesApi;
use crate::domain::{DomainError, Note};

const KEEP_API: &str = "https://keep.googleapis.com/v1";
const PAGE_SIZE: &str = "100";

pub struct GoogleKeepClient {
    client: Arc<GoogleClient>,
}

impl GoogleKeepClient {
    pub fn new(client: Arc<GoogleClient>) -> Self {
        Self { client }
    }
}

/// Resource URL for a note, accepting both `notes/abc` and bare `abc`.
fn note_url(note_id: &str) -> String {
    let bare = note_id.trim().trim_start_matches("notes/");
    format!("{KEEP_API}/notes/{}", segment(bare))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteList {
    #[serde(default)]
    notes: Vec<NoteResource>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteResource {
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<NoteBody>,
    #[serde(default)]
    pinned: Option<bool>,
    #[serde(default)]
    trashed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteBody {
    #[serde(default)]
    text: Option<TextContent>,
    #[serde(default)]
    list: Option<ListContent>,
}

#[derive(Debug, Default, Deserialize)]
struct TextContent {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListContent {
    #[serde(default)]
    list_items: Vec<ListItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListItem {
    #[serde(default)]
    text: Option<TextContent>,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    child_list_items: Vec<ListItem>,
}

impl NoteBody {
    fn flatten(self) -> String {
        if let Some(text) = self.text {
            return text.text;
        }
        let mut lines = Vec::new();
        if let Some(list) = self.list {
            flatten_items(&list.list_items, 0, &mut lines);
        }
        lines.join("\n")
    }
}

fn flatten_items(items: &[ListItem], depth: usize, lines: &mut Vec<String>) {
    for item in items {
        let mark = if item.checked { "[x]" } else { "[ ]" };
        let text = item.text.as_ref().map_or("", |t| t.text.as_str());
        lines.push(format!("{}{mark} {text}", "  ".repeat(depth)));
        flatten_items(&item.child_list_items, depth + 1, lines);
    }
}

impl From<NoteResource> for Note {
    fn from(resource: NoteResource) -> Self {
        Note {
            id: resource.name,
            title: resource.title,
            text: resource.body.map(NoteBody::flatten).unwrap_or_default(),
            pinned: resource.pinned,
            trashed: resource.trashed,
        }
    }
}

fn note_body(title: &str, text: &str) -> Value {
    json!({ "title": title, "body": { "text": { "text": text } } })
}

impl NotesApi for GoogleKeepClient {
    fn list_notes(&self) -> Result<Vec<Note>, DomainError> {
        let url = format!("{KEEP_API}/notes");
        let mut notes = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("filter", "trashed=false"), ("pageSize", PAGE_SIZE)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let page: NoteList = self.client.get_json(&url, &query)?;
            notes.extend(page.notes.into_iter().map(Note::from));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(notes)
    }

    fn get_note(&self, note_id: &str) -> Result<Note, DomainError> {
        let resource: NoteResource = self.client.get_json(&note_url(note_id), &[])?;
        Ok(resource.into())
    }

    fn create_note(&self, title: &str, text: &str) -> Result<Note, DomainError> {
        let created: NoteResource = self.client.send_json(
            "POST",
            &format!("{KEEP_API}/notes"),
            &[],
            &note_body(title, text),
        )?;
        Ok(created.into())
    }

    fn delete_note(&self, note_id: &str) -> Result<(), DomainError> {
        self.client.delete(&note_url(note_id))
    }
}
