use std::path::Path;
use std::sync::Arc;

use super::{required, MailApi};
use crate::domain::{Attachment, DomainError, MailMessage, OutgoingMessage};

const MAX_LIST_RESULTS: u32 = 500;

#[derive(Clone)]
pub struct MailService {
    mail: Arc<dyn MailApi>,
}

impl MailService {
    pub fn new(mail: Arc<dyn MailApi>) -> Self {
        Self { mail }
    }

    pub fn recent(&self, limit: u32) -> Result<String, DomainError> {
        let messages = self.fetch(None, limit)?;
        Ok(render_summaries(&messages))
    }

    pub fn search(&self, query: &str, limit: u32) -> Result<String, DomainError> {
        required(query, "query")?;
        let messages = self.fetch(Some(query), limit)?;
        Ok(render_summaries(&messages))
    }

    pub fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        cc: &str,
        bcc: &str,
        attachments: &[String],
    ) -> Result<String, DomainError> {
        let to = single_line(required(to, "to")?, "to")?;
        let cc = single_line(cc.trim(), "cc")?;
        let bcc = single_line(bcc.trim(), "bcc")?;
        let subject = single_line(subject, "subject")?;
        let attachments = attachments
            .iter()
            .map(|path| load_attachment(Path::new(path)))
            .collect::<Result<Vec<_>, _>>()?;

        let sent = self.mail.send_message(&OutgoingMessage {
            to: to.to_string(),
            cc: cc.to_string(),
            bcc: bcc.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            attachments,
        })?;

        Ok(format!("Email sent to {to} (message ID: {})", sent.id))
    }

    pub fn thread(&self, thread_id: &str) -> Result<String, DomainError> {
        let thread_id = required(thread_id, "thread_id")?;
        let thread = self.mail.get_thread(thread_id)?;

        let mut out = format!(
            "Thread {} ({} message(s))\n",
            thread.id,
            thread.messages.len()
        );
        for (position, message) in thread.messages.iter().enumerate() {
            out.push_str(&format!("\n--- Message {} ---\n", position + 1));
            out.push_str(&format!("From: {}\n", message.from));
            out.push_str(&format!("To: {}\n", message.to));
            out.push_str(&format!("Date: {}\n", message.date));
            out.push_str(&format!("Subject: {}\n\n", message.subject));
            let body = if message.body.trim().is_empty() {
                message.snippet.as_str()
            } else {
                message.body.trim_end()
            };
            out.push_str(body);
            out.push('\n');
        }
        Ok(out)
    }

    fn fetch(&self, query: Option<&str>, limit: u32) -> Result<Vec<MailMessage>, DomainError> {
        self.mail
            .list_messages(query, limit.clamp(1, MAX_LIST_RESULTS))?
            .iter()
            .map(|reference| self.mail.get_message(&reference.id))
            .collect()
    }
}

/// Header values must stay on one line; a CR or LF would start a new header.
fn single_line<'a>(value: &'a str, field: &str) -> Result<&'a str, DomainError> {
    if value.contains(['\r', '\n']) {
        return Err(DomainError::validation(format!(
            "{field} must not contain line breaks"
        )));
    }
    Ok(value)
}

fn render_summaries(messages: &[MailMessage]) -> String {
    if messages.is_empty() {
        return "No emails found.".to_string();
    }

    let mut out = format!("Found {} email(s):\n", messages.len());
    for (position, message) in messages.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. From: {}\n   Subject: {}\n   Date: {}\n   ID: {} | Thread: {}\n",
            position + 1,
            message.from,
            message.subject,
            message.date,
            message.id,
            message.thread_id
        ));
        if !message.snippet.is_empty() {
            out.push_str(&format!("   {}\n", message.snippet));
        }
    }
    out
}

fn load_attachment(path: &Path) -> Result<Attachment, DomainError> {
    let data = std::fs::read(path).map_err(|err| {
        DomainError::validation(format!(
            "cannot read attachment {}: {err}",
            path.display()
        ))
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    Ok(Attachment {
        content_type: content_type_for(&filename).to_string(),
        filename,
        data,
    })
}

fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "md" => "text/markdown",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::application::services::fakes::FakeProviders;

    fn message(id: &str, thread: &str, subject: &str) -> MailMessage {
        MailMessage {
            id: id.into(),
            thread_id: thread.into(),
            from: "bob@example.com".into(),
            to: "me@example.com".into(),
            subject: subject.into(),
            date: "Mon, 6 May 2024 09:00:00 +0000".into(),
            snippet: format!("snippet {id}"),
            body: String::new(),
        }
    }

    #[test]
    fn test_send_with_defaults_has_no_cc_bcc_or_attachments() {
        let fakes = FakeProviders::new();
        let status = MailService::new(fakes.mail.clone())
            .send("a@x.com", "S", "B", "", "", &[])
            .unwrap();

        assert_eq!(status, "Email sent to a@x.com (message ID: sent-1)");
        let sent = fakes.mail.sent.lock();
        assert_eq!(
            sent[0],
            OutgoingMessage {
                to: "a@x.com".into(),
                subject: "S".into(),
                body: "B".into(),
                ..OutgoingMessage::default()
            }
        );
    }

    #[test]
    fn test_line_breaks_in_headers_are_rejected() {
        let fakes = FakeProviders::new();
        let mail = MailService::new(fakes.mail.clone());

        let cases = [
            ("a@x.com", "Hi\r\nBcc: attacker@evil.com", "", ""),
            ("a@x.com\nBcc: attacker@evil.com", "S", "", ""),
            ("a@x.com", "S", "c@x.com\r\nX-Injected: 1", ""),
            ("a@x.com", "S", "", "d@x.com\rTo: e@x.com"),
        ];
        for (to, subject, cc, bcc) in cases {
            let err = mail.send(to, subject, "B", cc, bcc, &[]).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "{subject:?}");
        }
        assert!(fakes.mail.sent.lock().is_empty());

        mail.send("a@x.com", "S", "line one\r\nline two", "", "", &[])
            .unwrap();
        assert_eq!(fakes.mail.sent.lock().len(), 1);
    }

    #[test]
    fn test_send_reads_attachments_from_disk() {
        let fakes = FakeProviders::new();
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"a,b\n1,2\n").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        MailService::new(fakes.mail.clone())
            .send("a@x.com", "S", "B", "c@x.com", "", &[path])
            .unwrap();

        let sent = fakes.mail.sent.lock();
        assert_eq!(sent[0].cc, "c@x.com");
        assert_eq!(sent[0].attachments[0].content_type, "text/csv");
        assert_eq!(sent[0].attachments[0].data, b"a,b\n1,2\n");
    }

    #[test]
    fn test_missing_attachment_is_validation_error() {
        let fakes = FakeProviders::new();
        let err = MailService::new(fakes.mail.clone())
            .send("a@x.com", "S", "B", "", "", &["/no/such/file.pdf".into()])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fakes.mail.sent.lock().is_empty());
    }

    #[test]
    fn test_search_forwards_query_and_limit() {
        let fakes = FakeProviders::new();
        *fakes.mail.messages.lock() = vec![message("m1", "t1", "Invoice")];

        let text = MailService::new(fakes.mail.clone())
            .search("from:bob is:unread", 3)
            .unwrap();

        assert!(text.contains("Subject: Invoice"));
        assert_eq!(
            fakes.mail.listings.lock()[0],
            (Some("from:bob is:unread".to_string()), 3)
        );
    }

    #[test]
    fn test_search_query_is_forwarded_verbatim() {
        let fakes = FakeProviders::new();
        MailService::new(fakes.mail.clone())
            .search(" subject:\"weekly report\" ", 10)
            .unwrap();
        assert_eq!(
            fakes.mail.listings.lock()[0].0.as_deref(),
            Some(" subject:\"weekly report\" ")
        );
    }

    #[test]
    fn test_thread_falls_back_to_snippet() {
        let fakes = FakeProviders::new();
        let mut reply = message("m2", "t1", "Re: Invoice");
        reply.body = "Paid, thanks.\n".into();
        *fakes.mail.messages.lock() = vec![message("m1", "t1", "Invoice"), reply];

        let text = MailService::new(fakes.mail.clone()).thread("t1").unwrap();
        assert!(text.starts_with("Thread t1 (2 message(s))"));
        assert!(text.contains("snippet m1"));
        assert!(text.contains("Paid, thanks.\n"));
    }
}
