//! RFC 5322 message assembly for outgoing mail.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::domain::OutgoingMessage;

const LINE_WIDTH: usize = 76;

pub fn build_mime(message: &OutgoingMessage) -> String {
    let boundary = format!("fusion-{}", Uuid::new_v4().simple());
    build_mime_with_boundary(message, &boundary)
}

pub fn build_mime_with_boundary(message: &OutgoingMessage, boundary: &str) -> String {
    let mut out = String::new();
    push_header(&mut out, "To", &message.to);
    if !message.cc.is_empty() {
        push_header(&mut out, "Cc", &message.cc);
    }
    if !message.bcc.is_empty() {
        push_header(&mut out, "Bcc", &message.bcc);
    }
    push_header(&mut out, "Subject", &encode_header(&message.subject));
    push_header(&mut out, "MIME-Version", "1.0");

    if message.attachments.is_empty() {
        push_text_part_headers(&mut out);
        out.push_str("\r\n");
        out.push_str(&normalize_newlines(&message.body));
        return out;
    }

    push_header(
        &mut out,
        "Content-Type",
        &format!("multipart/mixed; boundary=\"{boundary}\""),
    );
    out.push_str("\r\n");

    out.push_str(&format!("--{boundary}\r\n"));
    push_text_part_headers(&mut out);
    out.push_str("\r\n");
    out.push_str(&normalize_newlines(&message.body));
    out.push_str("\r\n");

    for attachment in &message.attachments {
        let filename = attachment.filename.replace('"', "");
        out.push_str(&format!("--{boundary}\r\n"));
        push_header(
            &mut out,
            "Content-Type",
            &format!("{}; name=\"{filename}\"", attachment.content_type),
        );
        push_header(
            &mut out,
            "Content-Disposition",
            &format!("attachment; filename=\"{filename}\""),
        );
        push_header(&mut out, "Content-Transfer-Encoding", "base64");
        out.push_str("\r\n");
        out.push_str(&wrap_base64(&attachment.data));
    }
    out.push_str(&format!("--{boundary}--\r\n"));
    out
}

fn push_header(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value);
    out.push_str("\r\n");
}

fn push_text_part_headers(out: &mut String) {
    push_header(out, "Content-Type", "text/plain; charset=\"UTF-8\"");
    push_header(out, "Content-Transfer-Encoding", "8bit");
}

/// RFC 2047 encoded-word for non-ASCII header values.
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn normalize_newlines(body: &str) -> String {
    body.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_WIDTH * 2 + 2);
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}
