use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{segment, GoogleClient};
use crate::application::services::DriveApi;
use crate::domain::{DomainError, DriveFile, FileListQuery, NewFile};

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";

const FILE_FIELDS: &str =
    "id,name,mimeType,createdTime,modifiedTime,size,webViewLink,description,owners(displayName,emailAddress),parents";
const LIST_FIELDS: &str = "files(id,name,mimeType,createdTime,modifiedTime,webViewLink)";

pub struct GoogleDriveClient {
    client: Arc<GoogleClient>,
}

impl GoogleDriveClient {
    pub fn new(client: Arc<GoogleClient>) -> Self {
        Self { client }
    }

    fn file_url(file_id: &str) -> String {
        format!("{DRIVE_API}/files/{}", segment(file_id))
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

fn file_body(file: &NewFile) -> Value {
    let mut body = json!({
        "name": file.name,
        "mimeType": file.mime_type,
    });
    if let Some(parent) = &file.parent_id {
        body["parents"] = json!([parent]);
    }
    body
}

impl DriveApi for GoogleDriveClient {
    fn list_files(&self, query: &FileListQuery) -> Result<Vec<DriveFile>, DomainError> {
        let page_size = query.page_size.to_string();
        let mut params = vec![
            ("q", query.q.as_str()),
            ("pageSize", page_size.as_str()),
            ("fields", LIST_FIELDS),
        ];
        if let Some(order_by) = query.order_by.as_deref() {
            params.push(("orderBy", order_by));
        }

        let list: FileList = self
            .client
            .get_json(&format!("{DRIVE_API}/files"), &params)?;
        Ok(list.files)
    }

    fn create_file(&self, file: &NewFile) -> Result<DriveFile, DomainError> {
        self.client.send_json(
            "POST",
            &format!("{DRIVE_API}/files"),
            &[("fields", FILE_FIELDS)],
            &file_body(file),
        )
    }

    fn get_file(&self, file_id: &str) -> Result<DriveFile, DomainError> {
        self.client
            .get_json(&Self::file_url(file_id), &[("fields", FILE_FIELDS)])
    }

    fn move_to_folder(&self, file_id: &str, folder_id: &str) -> Result<(), DomainError> {
        let current: DriveFile = self
            .client
            .get_json(&Self::file_url(file_id), &[("fields", "id,parents")])?;
        let previous = current.parents.join(",");

        let _: Value = self.client.send_json(
            "PATCH",
            &Self::file_url(file_id),
            &[
                ("addParents", folder_id),
                ("removeParents", previous.as_str()),
                ("fields", "id,parents"),
            ],
            &json!({}),
        )?;
        Ok(())
    }
}
