use std::sync::Arc;

use tracing::warn;

use super::{required, NotesApi};
use crate::domain::{DomainError, Note};

#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NotesApi>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NotesApi>) -> Self {
        Self { notes }
    }

    pub fn find(&self, query: &str) -> Result<String, DomainError> {
        let matches = self.matching(query)?;
        Ok(render_notes(&matches, "notes"))
    }

    /// Pinned notes matching `query`. The Keep API may omit pin state, in which
    /// case the answer says so rather than reporting an empty result.
    pub fn pinned(&self, query: &str) -> Result<String, DomainError> {
        let candidates = self.matching(query)?;
        if !candidates.is_empty() && candidates.iter().all(|note| note.pinned.is_none()) {
            return Ok(format!(
                "Pin state is not available from the Keep API; cannot tell which of {} matching notes are pinned.",
                candidates.len()
            ));
        }
        let pinned: Vec<Note> = candidates
            .into_iter()
            .filter(|note| note.pinned == Some(true))
            .collect();
        Ok(render_notes(&pinned, "pinned notes"))
    }

    pub fn create(&self, title: Option<&str>, text: Option<&str>) -> Result<String, DomainError> {
        let note = self
            .notes
            .create_note(title.unwrap_or_default(), text.unwrap_or_default())?;
        Ok(format!("Created note with ID: {}", note.id))
    }

    pub fn update(
        &self,
        note_id: &str,
        title: Option<&str>,
        text: Option<&str>,
    ) -> Result<String, DomainError> {
        let note_id = required(note_id, "note_id")?;
        if title.is_none() && text.is_none() {
            return Err(DomainError::validation(
                "provide at least one of title or text to update",
            ));
        }

        // Notes are immutable remotely: write the merged note, then drop the original.
        let current = self.notes.get_note(note_id)?;
        let replacement = self.notes.create_note(
            title.unwrap_or(current.title.as_str()),
            text.unwrap_or(current.text.as_str()),
        )?;
        if let Err(err) = self.notes.delete_note(&current.id) {
            warn!(
                target: "fusion::dispatch",
                original = %current.id,
                replacement = %replacement.id,
                error = %err,
                "replacement note created but original was not deleted"
            );
            return Err(DomainError::provider(format!(
                "created replacement note {} but could not delete {}: {err}",
                replacement.id, current.id
            )));
        }

        Ok(format!(
            "Updated note {}. Keep notes cannot be edited in place, so it was recreated with new ID: {}",
            current.id, replacement.id
        ))
    }

    pub fn delete(&self, note_id: &str) -> Result<String, DomainError> {
        let note_id = required(note_id, "note_id")?;
        self.notes.delete_note(note_id)?;
        Ok(format!("Deleted note {note_id}"))
    }

    fn matching(&self, query: &str) -> Result<Vec<Note>, DomainError> {
        Ok(self
            .notes
            .list_notes()?
            .into_iter()
            .filter(|note| !note.trashed)
            .filter(|note| note.matches(query))
            .collect())
    }
}

fn render_notes(notes: &[Note], noun: &str) -> String {
    if notes.is_empty() {
        return format!("No {noun} found.");
    }

    let mut out = format!("Found {} {noun}:\n", notes.len());
    for note in notes {
        let title = if note.title.is_empty() {
            "(untitled)"
        } else {
            note.title.as_str()
        };
        let pin = if note.pinned == Some(true) { " [pinned]" } else { "" };
        out.push_str(&format!("- {title}{pin} (ID: {})\n", note.id));
        for line in note.text.lines() {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fakes::FakeProviders;

    fn seeded() -> FakeProviders {
        let fakes = FakeProviders::new();
        *fakes.notes.notes.lock() = vec![
            Note {
                id: "notes/1".into(),
                title: "Groceries".into(),
                text: "milk\neggs".into(),
                pinned: Some(true),
                ..Note::default()
            },
            Note {
                id: "notes/2".into(),
                title: "Ideas".into(),
                text: "grocery delivery app".into(),
                pinned: Some(false),
                ..Note::default()
            },
            Note {
                id: "notes/3".into(),
                title: "Old groceries".into(),
                trashed: true,
                ..Note::default()
            },
        ];
        fakes
    }

    #[test]
    fn test_find_skips_trashed_and_matches_text() {
        let fakes = seeded();
        let text = NoteService::new(fakes.notes.clone()).find("grocer").unwrap();
        assert!(text.starts_with("Found 2 notes:"));
        assert!(text.contains("- Groceries [pinned] (ID: notes/1)\n  milk\n  eggs\n"));
        assert!(!text.contains("notes/3"));
    }

    #[test]
    fn test_pinned_only_returns_pinned() {
        let fakes = seeded();
        let text = NoteService::new(fakes.notes.clone()).pinned("").unwrap();
        assert!(text.starts_with("Found 1 pinned notes:"));
        assert!(!text.contains("Ideas"));
    }

    #[test]
    fn test_pinned_reports_missing_pin_state() {
        let fakes = FakeProviders::new();
        *fakes.notes.notes.lock() = vec![
            Note {
                id: "notes/1".into(),
                title: "Groceries".into(),
                ..Note::default()
            },
            Note {
                id: "notes/2".into(),
                title: "Ideas".into(),
                ..Note::default()
            },
        ];

        let text = NoteService::new(fakes.notes.clone()).pinned("").unwrap();
        assert_eq!(
            text,
            "Pin state is not available from the Keep API; cannot tell which of 2 matching notes are pinned."
        );
    }

    #[test]
    fn test_update_requires_a_change() {
        let fakes = seeded();
        let notes = NoteService::new(fakes.notes.clone());
        let err = notes.update("notes/1", None, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(fakes.notes.notes.lock().len(), 3);
        assert!(fakes.notes.deleted.lock().is_empty());
    }

    #[test]
    fn test_update_recreates_note_with_merged_fields() {
        let fakes = seeded();
        let notes = NoteService::new(fakes.notes.clone());

        let text = notes.update("notes/1", Some("Shopping"), None).unwrap();
        assert_eq!(
            text,
            "Updated note notes/1. Keep notes cannot be edited in place, so it was recreated with new ID: notes/4"
        );
        assert_eq!(*fakes.notes.deleted.lock(), vec!["notes/1".to_string()]);

        let stored = fakes.notes.notes.lock();
        let replacement = stored.iter().find(|note| note.id == "notes/4").unwrap();
        assert_eq!(replacement.title, "Shopping");
        assert_eq!(replacement.text, "milk\neggs");
        assert!(stored.iter().all(|note| note.id != "notes/1"));
    }

    #[test]
    fn test_update_of_missing_note_creates_nothing() {
        let fakes = seeded();
        let err = NoteService::new(fakes.notes.clone())
            .update("notes/9", None, Some("x"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(fakes.notes.notes.lock().len(), 3);
    }

    #[test]
    fn test_create_and_delete() {
        let fakes = FakeProviders::new();
        let notes = NoteService::new(fakes.notes.clone());
        assert_eq!(
            notes.create(None, Some("body")).unwrap(),
            "Created note with ID: notes/1"
        );
        assert_eq!(notes.delete("notes/1").unwrap(), "Deleted note notes/1");
        assert_eq!(*fakes.notes.deleted.lock(), vec!["notes/1".to_string()]);
    }
}
