use std::sync::Arc;

use super::{required, DriveApi};
use crate::domain::{DomainError, DriveFile, FileListQuery, NewFile, SearchScope};

pub const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

const MAX_PAGE_SIZE: u32 = 1000;

/// Listing, search and metadata operations over the file store.
#[derive(Clone)]
pub struct DriveService {
    drive: Arc<dyn DriveApi>,
}

impl DriveService {
    pub fn new(drive: Arc<dyn DriveApi>) -> Self {
        Self { drive }
    }

    pub fn list_documents(
        &self,
        max_results: u32,
        query: Option<&str>,
        order_by: &str,
    ) -> Result<String, DomainError> {
        let mut q = documents_clause();
        if let Some(query) = query.map(str::trim).filter(|query| !query.is_empty()) {
            q.push_str(&format!(" and name contains '{}'", escape_literal(query)));
        }

        let order_by = order_by.trim();
        let files = self.drive.list_files(&FileListQuery {
            q,
            page_size: max_results.clamp(1, MAX_PAGE_SIZE),
            order_by: (!order_by.is_empty()).then(|| order_by.to_string()),
        })?;

        Ok(render_file_list(&files, "document"))
    }

    pub fn search_documents(
        &self,
        search_query: &str,
        scope: SearchScope,
        max_results: u32,
        modified_after: Option<&str>,
    ) -> Result<String, DomainError> {
        required(search_query, "search_query")?;
        let term = escape_literal(search_query);
        let matcher = match scope {
            SearchScope::Name => format!("name contains '{term}'"),
            SearchScope::Content => format!("fullText contains '{term}'"),
            SearchScope::Both => {
                format!("(name contains '{term}' or fullText contains '{term}')")
            }
        };

        let mut q = format!("{} and {matcher}", documents_clause());
        if let Some(after) = modified_after
            .map(str::trim)
            .filter(|after| !after.is_empty())
        {
            q.push_str(&format!(" and modifiedTime > '{}'", escape_literal(after)));
        }

        // Full-text queries reject an explicit ordering.
        let files = self.drive.list_files(&FileListQuery {
            q,
            page_size: max_results.clamp(1, MAX_PAGE_SIZE),
            order_by: None,
        })?;

        Ok(render_file_list(&files, "document"))
    }

    pub fn create_folder(
        &self,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let name = required(name, "name")?;
        let folder = self.drive.create_file(&NewFile {
            name: name.to_string(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            parent_id: parent_folder_id
                .map(str::trim)
                .filter(|parent| !parent.is_empty())
                .map(str::to_string),
        })?;

        Ok(format!("Created folder '{name}' with ID: {}", folder.id))
    }

    pub fn file_info(&self, file_id: &str) -> Result<String, DomainError> {
        let file_id = required(file_id, "file_id")?;
        let file = self.drive.get_file(file_id)?;
        Ok(render_file_details(&file))
    }
}

fn documents_clause() -> String {
    format!("mimeType='{DOCUMENT_MIME_TYPE}' and trashed=false")
}

/// Escape a value for use inside a single-quoted Drive query literal.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn render_file_list(files: &[DriveFile], noun: &str) -> String {
    if files.is_empty() {
        return format!("No {noun}s found.");
    }

    let mut out = format!("Found {} {noun}(s):\n", files.len());
    for (position, file) in files.iter().enumerate() {
        out.push_str(&format!("{}. {} (ID: {})\n", position + 1, file.name, file.id));
        if let Some(modified) = &file.modified_time {
            out.push_str(&format!("   Modified: {modified}\n"));
        }
        if let Some(link) = &file.web_view_link {
            out.push_str(&format!("   Link: {link}\n"));
        }
    }
    out
}

fn render_file_details(file: &DriveFile) -> String {
    let mut lines = vec![format!("Name: {}", file.name), format!("ID: {}", file.id)];

    let optional = [
        ("Type", &file.mime_type),
        ("Size", &file.size),
        ("Created", &file.created_time),
        ("Modified", &file.modified_time),
        ("Description", &file.description),
        ("Link", &file.web_view_link),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    }

    let owners: Vec<String> = file
        .owners
        .iter()
        .filter_map(|owner| match (&owner.display_name, &owner.email_address) {
            (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
            (Some(name), None) => Some(name.clone()),
            (None, Some(email)) => Some(email.clone()),
            (None, None) => None,
        })
        .collect();
    if !owners.is_empty() {
        lines.push(format!("Owners: {}", owners.join(", ")));
    }
    if !file.parents.is_empty() {
        lines.push(format!("Parents: {}", file.parents.join(", ")));
    }

    lines.join("\n")
}
