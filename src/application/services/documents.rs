use std::sync::Arc;

use serde_json::Value;

use super::{required, DocsApi, DriveApi};
use crate::domain::{DocumentFormat, DomainError, TextInsertion};

/// Read, append and create operations over remote documents.
#[derive(Clone)]
pub struct DocumentService {
    docs: Arc<dyn DocsApi>,
    drive: Arc<dyn DriveApi>,
}

impl DocumentService {
    pub fn new(docs: Arc<dyn DocsApi>, drive: Arc<dyn DriveApi>) -> Self {
        Self { docs, drive }
    }

    pub fn read(
        &self,
        document_id: &str,
        format: DocumentFormat,
        tab_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let document_id = required(document_id, "document_id")?;
        let tab_id = non_blank(tab_id);
        let document = self.docs.get_document(document_id, tab_id.is_some())?;

        let (scope, body) = match tab_id {
            Some(tab_id) => {
                let tab = find_tab(&document, tab_id).ok_or_else(|| {
                    DomainError::not_found(format!(
                        "Tab '{tab_id}' not found in document {document_id}"
                    ))
                })?;
                (tab, &tab["documentTab"]["body"])
            }
            None => (&document, default_body(&document)),
        };

        match format {
            DocumentFormat::Json => serde_json::to_string_pretty(scope)
                .map_err(|err| DomainError::other(err.to_string())),
            DocumentFormat::Text => Ok(render_text(body)),
            DocumentFormat::Markdown => Ok(render_markdown(body)),
        }
    }

    pub fn append(
        &self,
        document_id: &str,
        text: &str,
        add_newline: bool,
        tab_id: Option<&str>,
    ) -> Result<String, DomainError> {
        let document_id = required(document_id, "document_id")?;
        let tab_id = non_blank(tab_id);
        let document = self.docs.get_document(document_id, tab_id.is_some())?;

        let body = match tab_id {
            Some(tab_id) => {
                let tab = find_tab(&document, tab_id).ok_or_else(|| {
                    DomainError::not_found(format!(
                        "Tab '{tab_id}' not found in document {document_id}"
                    ))
                })?;
                &tab["documentTab"]["body"]
            }
            None => default_body(&document),
        };

        // The final newline of a body segment cannot be written before.
        let index = (end_index(body) - 1).max(1);
        let text = if add_newline {
            format!("\n{text}")
        } else {
            text.to_string()
        };

        self.docs.insert_text(
            document_id,
            &TextInsertion {
                text,
                index,
                tab_id: tab_id.map(str::to_string),
            },
        )?;

        Ok(format!("Successfully appended text to document {document_id}"))
    }

    pub fn create(
        &self,
        title: &str,
        parent_folder_id: Option<&str>,
        initial_content: Option<&str>,
    ) -> Result<String, DomainError> {
        let title = required(title, "title")?;
        let document_id = self.docs.create_document(title)?;

        if let Some(folder_id) = non_blank(parent_folder_id) {
            self.drive.move_to_folder(&document_id, folder_id)?;
        }

        if let Some(content) = initial_content.filter(|content| !content.is_empty()) {
            self.docs.insert_text(
                &document_id,
                &TextInsertion {
                    text: content.to_string(),
                    index: 1,
                    tab_id: None,
                },
            )?;
        }

        Ok(format!(
            "Created document '{title}' with ID: {document_id}\nURL: https://docs.google.com/document/d/{document_id}/edit"
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Body of the legacy single-tab view, falling back to the first tab.
fn default_body(document: &Value) -> &Value {
    if document["body"].is_object() {
        return &document["body"];
    }
    &document["tabs"][0]["documentTab"]["body"]
}

fn find_tab<'a>(document: &'a Value, tab_id: &str) -> Option<&'a Value> {
    fn search<'a>(tabs: &'a Value, tab_id: &str) -> Option<&'a Value> {
        tabs.as_array()?.iter().find_map(|tab| {
            if tab["tabProperties"]["tabId"].as_str() == Some(tab_id) {
                Some(tab)
            } else {
                search(&tab["childTabs"], tab_id)
            }
        })
    }
    search(&document["tabs"], tab_id)
}

fn end_index(body: &Value) -> i64 {
    body["content"]
        .as_array()
        .and_then(|content| content.last())
        .and_then(|element| element["endIndex"].as_i64())
        .unwrap_or(1)
}

fn elements(content: &Value) -> impl Iterator<Item = &Value> {
    content.as_array().into_iter().flatten()
}

fn render_text(body: &Value) -> String {
    let mut out = String::new();
    collect_text(&body["content"], &mut out);
    out
}

fn collect_text(content: &Value, out: &mut String) {
    for element in elements(content) {
        if let Some(paragraph) = element.get("paragraph") {
            for run in elements(&paragraph["elements"]) {
                if let Some(text) = run["textRun"]["content"].as_str() {
                    out.push_str(text);
                }
            }
        } else if let Some(table) = element.get("table") {
            for row in elements(&table["tableRows"]) {
                for cell in elements(&row["tableCells"]) {
                    collect_text(&cell["content"], out);
                }
            }
        } else if let Some(toc) = element.get("tableOfContents") {
            collect_text(&toc["content"], out);
        }
    }
}

fn render_markdown(body: &Value) -> String {
    let mut lines = Vec::new();
    collect_markdown(&body["content"], &mut lines);
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn collect_markdown(content: &Value, lines: &mut Vec<String>) {
    for element in elements(content) {
        if let Some(paragraph) = element.get("paragraph") {
            let mut line = String::new();
            for run in elements(&paragraph["elements"]) {
                let Some(text) = run["textRun"]["content"].as_str() else {
                    continue;
                };
                line.push_str(&styled_run(text, &run["textRun"]["textStyle"]));
            }
            let line = line.trim_end_matches('\n').to_string();

            let prefix = match paragraph["paragraphStyle"]["namedStyleType"].as_str() {
                Some("TITLE") => "# ".to_string(),
                Some(style) if style.starts_with("HEADING_") => {
                    let level = style["HEADING_".len()..].parse::<usize>().unwrap_or(1);
                    format!("{} ", "#".repeat(level.clamp(1, 6)))
                }
                _ if paragraph.get("bullet").is_some() => "- ".to_string(),
                _ => String::new(),
            };

            if line.trim().is_empty() {
                lines.push(String::new());
            } else {
                lines.push(format!("{prefix}{line}"));
            }
        } else if let Some(table) = element.get("table") {
            render_table(table, lines);
        } else if let Some(toc) = element.get("tableOfContents") {
            collect_markdown(&toc["content"], lines);
        }
    }
}

/// Emphasis markers hug the visible text; surrounding whitespace stays outside them.
fn styled_run(text: &str, style: &Value) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let bold = style["bold"].as_bool().unwrap_or(false);
    let italic = style["italic"].as_bool().unwrap_or(false);
    let marker = match (bold, italic) {
        (true, true) => "***",
        (true, false) => "**",
        (false, true) => "*",
        (false, false) => return text.to_string(),
    };
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    format!("{leading}{marker}{core}{marker}{trailing}")
}

fn render_table(table: &Value, lines: &mut Vec<String>) {
    for (row_index, row) in elements(&table["tableRows"]).enumerate() {
        let cells: Vec<String> = elements(&row["tableCells"])
            .map(|cell| {
                let mut text = String::new();
                collect_text(&cell["content"], &mut text);
                text.trim().replace('\n', " ")
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
        if row_index == 0 {
            let divider = vec!["---"; cells.len()].join(" | ");
            lines.push(format!("| {divider} |"));
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::services::fakes::FakeProviders;

    fn service(fakes: &FakeProviders) -> DocumentService {
        DocumentService::new(fakes.docs.clone(), fakes.drive.clone())
    }

    #[test]
    fn test_append_inserts_newline_then_text_at_end() {
        let fakes = FakeProviders::new();
        let status = service(&fakes).append("doc1", "hello", true, None).unwrap();

        assert!(status.contains("doc1"));
        let insertions = fakes.docs.insertions.lock();
        assert_eq!(insertions.len(), 1);
        assert_eq!(
            insertions[0],
            (
                "doc1".to_string(),
                TextInsertion {
                    text: "\nhello".into(),
                    index: 12,
                    tab_id: None,
                }
            )
        );
    }

    #[test]
    fn test_append_without_newline_targets_tab_body() {
        let fakes = FakeProviders::new();
        *fakes.docs.document.lock() = json!({
            "tabs": [{
                "tabProperties": { "tabId": "t.0" },
                "documentTab": { "body": { "content": [{ "endIndex": 5 }] } },
                "childTabs": [{
                    "tabProperties": { "tabId": "t.child" },
                    "documentTab": { "body": { "content": [{ "endIndex": 40 }] } }
                }]
            }]
        });

        service(&fakes)
            .append("doc1", "tail", false, Some("t.child"))
            .unwrap();

        assert_eq!(fakes.docs.fetches.lock()[0], ("doc1".to_string(), true));
        let insertion = &fakes.docs.insertions.lock()[0].1;
        assert_eq!(insertion.text, "tail");
        assert_eq!(insertion.index, 39);
        assert_eq!(insertion.tab_id.as_deref(), Some("t.child"));
    }

    #[test]
    fn test_read_unknown_tab_is_not_found() {
        let fakes = FakeProviders::new();
        let err = service(&fakes)
            .read("doc1", DocumentFormat::Text, Some("missing"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn test_read_renders_text_and_markdown() {
        let fakes = FakeProviders::new();
        *fakes.docs.document.lock() = json!({
            "body": { "content": [
                { "paragraph": {
                    "paragraphStyle": { "namedStyleType": "HEADING_2" },
                    "elements": [{ "textRun": { "content": "Agenda\n" } }]
                } },
                { "paragraph": {
                    "bullet": { "listId": "l1" },
                    "elements": [
                        { "textRun": { "content": "Ship ", "textStyle": {} } },
                        { "textRun": { "content": "today", "textStyle": { "bold": true } } },
                        { "textRun": { "content": "\n" } }
                    ]
                } }
            ] }
        });
        let docs = service(&fakes);

        let text = docs.read("doc1", DocumentFormat::Text, None).unwrap();
        assert_eq!(text, "Agenda\nShip today\n");

        let markdown = docs.read("doc1", DocumentFormat::Markdown, None).unwrap();
        assert_eq!(markdown, "## Agenda\n- Ship **today**\n");
    }

    #[test]
    fn test_emphasis_markers_exclude_surrounding_whitespace() {
        let bold = json!({ "bold": true });
        assert_eq!(styled_run("today ", &bold), "**today** ");
        assert_eq!(styled_run(" now\n", &json!({ "italic": true })), " *now*\n");
        assert_eq!(styled_run("  ", &bold), "  ");
    }

    #[test]
    fn test_read_json_returns_provider_resource() {
        let fakes = FakeProviders::new();
        let json_text = service(&fakes)
            .read("doc1", DocumentFormat::Json, None)
            .unwrap();
        let parsed: Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(parsed["documentId"], "doc1");
    }

    #[test]
    fn test_create_moves_and_seeds_content() {
        let fakes = FakeProviders::new();
        let status = service(&fakes)
            .create("Notes", Some("folder-9"), Some("first line"))
            .unwrap();

        assert!(status.contains("new-doc"));
        assert_eq!(
            fakes.drive.moves.lock()[0],
            ("new-doc".to_string(), "folder-9".to_string())
        );
        let insertion = &fakes.docs.insertions.lock()[0].1;
        assert_eq!(insertion.index, 1);
        assert_eq!(insertion.text, "first line");
    }

    #[test]
    fn test_blank_document_id_never_reaches_provider() {
        let fakes = FakeProviders::new();
        let err = service(&fakes)
            .read("  ", DocumentFormat::Text, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(fakes.docs.fetches.lock().is_empty());
    }
}
