use std::sync::Arc;

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use serde_json::json;

use super::mime::build_mime;
use super::{segment, GoogleClient};
use crate::application::services::MailApi;
use crate::domain::{DomainError, MailMessage, MailThread, MessageRef, OutgoingMessage};

const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

pub struct GmailClient {
    client: Arc<GoogleClient>,
}

impl GmailClient {
    pub fn new(client: Arc<GoogleClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageId {
    id: String,
    #[serde(default)]
    thread_id: String,
}

impl From<MessageId> for MessageRef {
    fn from(message: MessageId) -> Self {
        MessageRef {
            id: message.id,
            thread_id: message.thread_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResource {
    id: String,
    #[serde(default)]
    thread_id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePart {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
struct Header {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ThreadResource {
    id: String,
    #[serde(default)]
    messages: Vec<MessageResource>,
}

impl MessagePart {
    fn header(&self, name: &str) -> String {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.clone())
            .unwrap_or_default()
    }

    fn decoded_body(&self) -> Option<String> {
        let data = self.body.as_ref()?.data.as_deref()?;
        let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn find_text(&self, mime_type: &str) -> Option<String> {
        if self.mime_type.eq_ignore_ascii_case(mime_type) {
            if let Some(text) = self.decoded_body().filter(|text| !text.is_empty()) {
                return Some(text);
            }
        }
        self.parts.iter().find_map(|part| part.find_text(mime_type))
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}

/// Project a full-format message resource onto the domain message.
fn parse_message(resource: MessageResource) -> MailMessage {
    let payload = resource.payload.unwrap_or_default();
    let body = payload
        .find_text("text/plain")
        .or_else(|| payload.find_text("text/html").map(|html| strip_tags(&html)))
        .unwrap_or_default();

    MailMessage {
        from: payload.header("From"),
        to: payload.header("To"),
        subject: payload.header("Subject"),
        date: payload.header("Date"),
        id: resource.id,
        thread_id: resource.thread_id,
        snippet: resource.snippet,
        body,
    }
}

impl MailApi for GmailClient {
    fn list_messages(
        &self,
        query: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, DomainError> {
        let max_results = max_results.to_string();
        let mut params = vec![("maxResults", max_results.as_str())];
        if let Some(query) = query {
            params.push(("q", query));
        }
        let list: MessageList = self
            .client
            .get_json(&format!("{GMAIL_API}/messages"), &params)?;
        Ok(list.messages.into_iter().map(MessageRef::from).collect())
    }

    fn get_message(&self, message_id: &str) -> Result<MailMessage, DomainError> {
        let resource: MessageResource = self.client.get_json(
            &format!("{GMAIL_API}/messages/{}", segment(message_id)),
            &[("format", "full")],
        )?;
        Ok(parse_message(resource))
    }

    fn send_message(&self, message: &OutgoingMessage) -> Result<MessageRef, DomainError> {
        let raw = URL_SAFE.encode(build_mime(message).as_bytes());
        let sent: MessageId = self.client.send_json(
            "POST",
            &format!("{GMAIL_API}/messages/send"),
            &[],
            &json!({ "raw": raw }),
        )?;
        Ok(sent.into())
    }

    fn get_thread(&self, thread_id: &str) -> Result<MailThread, DomainError> {
        let thread: ThreadResource = self.client.get_json(
            &format!("{GMAIL_API}/threads/{}", segment(thread_id)),
            &[("format", "full")],
        )?;
        Ok(MailThread {
            id: thread.id,
            messages: thread.messages.into_iter().map(parse_message).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(text: &str) -> String {
        URL_SAFE.encode(text.as_bytes())
    }

    #[test]
    fn test_parse_multipart_prefers_plain_text() {
        let resource: MessageResource = serde_json::from_value(json!({
            "id": "m1",
            "threadId": "t1",
            "snippet": "Hi there",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    { "name": "from", "value": "Ana <ana@x.com>" },
                    { "name": "Subject", "value": "Lunch?" }
                ],
                "parts": [
                    { "mimeType": "text/html", "body": { "data": encoded("<p>Hi <b>there</b></p>") } },
                    { "mimeType": "text/plain", "body": { "data": encoded("Hi there?") } }
                ]
            }
        }))
        .unwrap();

        let message = parse_message(resource);
        assert_eq!(message.from, "Ana <ana@x.com>");
        assert_eq!(message.subject, "Lunch?");
        assert_eq!(message.to, "");
        assert_eq!(message.body, "Hi there?");
        assert_eq!(message.thread_id, "t1");
    }

    #[test]
    fn test_parse_falls_back_to_html() {
        let resource: MessageResource = serde_json::from_value(json!({
            "id": "m2",
            "payload": {
                "mimeType": "text/html",
                "body": { "data": encoded("<div>Fish &amp; chips</div>") }
            }
        }))
        .unwrap();
        assert_eq!(parse_message(resource).body, "Fish & chips");
    }

    #[test]
    fn test_empty_message_list_decodes() {
        let list: MessageList = serde_json::from_value(json!({ "resultSizeEstimate": 0 })).unwrap();
        assert!(list.messages.is_empty());
    }
}
