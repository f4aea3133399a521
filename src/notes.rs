//! Append-only note ledger.
//!
//! Notes are minted here (fresh id, current timestamp, sanitized content) and
//! only ever pushed onto the end of a parent's `notesList`. There is no edit
//! or delete path.

use chrono::Utc;

use crate::error::{Result, TrackerError};
use crate::models::{Annotated, Entity, NewNote, Note};
use crate::validation::InputValidator;

/// Build a note from caller data
pub(crate) fn mint_note(id: String, data: NewNote) -> Result<Note> {
    InputValidator::validate_note(&data)?;
    Ok(Note {
        id,
        content: InputValidator::sanitize_text(&data.content),
        timestamp: Utc::now(),
        kind: data.kind,
    })
}

/// Append `note` to the record with `parent_id`, touching nothing else
pub(crate) fn append_note<T>(records: &mut [T], parent_id: &str, note: Note) -> Result<Note>
where
    T: Entity + Annotated,
{
    let parent = records
        .iter_mut()
        .find(|record| record.id() == parent_id)
        .ok_or_else(|| TrackerError::NotFound {
            kind: T::KIND,
            id: parent_id.to_string(),
        })?;
    parent.notes_list_mut().push(note.clone());
    Ok(note)
}

/// Notes ordered for display, newest first; the ledger itself is untouched
#[must_use]
pub fn notes_newest_first(notes: &[Note]) -> Vec<&Note> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Company, NoteType};
    use chrono::Duration;

    #[test]
    fn test_mint_trims_content() {
        let note = mint_note("n1".into(), NewNote::new("  call back  ")).unwrap();
        assert_eq!(note.content, "call back");
        assert_eq!(note.kind, None);
    }

    #[test]
    fn test_mint_rejects_blank() {
        assert!(matches!(
            mint_note("n1".into(), NewNote::new("   ")),
            Err(TrackerError::Validation(_))
        ));
    }

    #[test]
    fn test_append_to_missing_parent() {
        let mut companies = vec![Company::named("c1", "Acme")];
        let note = mint_note("n1".into(), NewNote::new("hello")).unwrap();
        let err = append_note(&mut companies, "nope", note).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { .. }));
        assert!(companies[0].notes_list.is_empty());
    }

    #[test]
    fn test_newest_first_keeps_ledger_order() {
        let mut older = mint_note("a".into(), NewNote::new("first")).unwrap();
        older.timestamp -= Duration::hours(1);
        let newer = mint_note("b".into(), NewNote::new("second").with_type(NoteType::Update)).unwrap();
        let ledger = vec![older, newer];

        let view = notes_newest_first(&ledger);
        assert_eq!(view[0].id, "b");
        assert_eq!(ledger[0].id, "a");
    }
}
