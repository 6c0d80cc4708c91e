use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{segment, GoogleClient};
use crate::application::services::DocsApi;
use crate::domain::{DomainError, TextInsertion};

const DOCS_API: &str = "https://docs.googleapis.com/v1";

pub struct GoogleDocsClient {
    client: Arc<GoogleClient>,
}

impl GoogleDocsClient {
    pub fn new(client: Arc<GoogleClient>) -> Self {
        Self { client }
    }

    fn document_url(document_id: &str) -> String {
        format!("{DOCS_API}/documents/{}", segment(document_id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

impl DocsApi for GoogleDocsClient {
    fn get_document(&self, document_id: &str, include_tabs: bool) -> Result<Value, DomainError> {
        let query: &[(&str, &str)] = if include_tabs {
            &[("includeTabsContent", "true")]
        } else {
            &[]
        };
        self.client
            .get_json(&Self::document_url(document_id), query)
    }

    fn create_document(&self, title: &str) -> Result<String, DomainError> {
        let created: CreatedDocument = self.client.send_json(
            "POST",
            &format!("{DOCS_API}/documents"),
            &[],
            &json!({ "title": title }),
        )?;
        Ok(created.document_id)
    }

    fn insert_text(
        &self,
        document_id: &str,
        insertion: &TextInsertion,
    ) -> Result<(), DomainError> {
        let url = format!("{}:batchUpdate", Self::document_url(document_id));
        let _: Value = self
            .client
            .send_json("POST", &url, &[], &batch_insert(insertion))?;
        Ok(())
    }
}

fn batch_insert(insertion: &TextInsertion) -> Value {
    let mut location = json!({ "index": insertion.index });
    if let Some(tab_id) = &insertion.tab_id {
        location["tabId"] = json!(tab_id);
    }
    json!({
        "requests": [{
            "insertText": {
                "location": location,
                "text": insertion.text,
            }
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_insert_payload() {
        let body = batch_insert(&TextInsertion {
            text: "\nhello".into(),
            index: 12,
            tab_id: Some("t.1".into()),
        });
        assert_eq!(
            body,
            json!({ "requests": [{ "insertText": {
                "location": { "index": 12, "tabId": "t.1" },
                "text": "\nhello"
            } }] })
        );
    }

    #[test]
    fn test_document_url_encodes_id() {
        assert_eq!(
            GoogleDocsClient::document_url("abc/def"),
            "https://docs.googleapis.com/v1/documents/abc%2Fdef"
        );
    }
}
