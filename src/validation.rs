use crate::error::{Result, TrackerError};
use crate::models::{Company, Contact, Job, NewNote, Task};

fn invalid(message: impl Into<String>) -> TrackerError {
    TrackerError::Validation(message.into())
}

/// Validation of records before they reach the store
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a record identifier
    pub fn validate_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(invalid("Id cannot be empty"));
        }

        if id.contains('\0') {
            return Err(invalid("Id contains invalid characters"));
        }

        Ok(())
    }

    /// Validate a field that must contain visible text
    pub fn validate_required(field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(invalid(format!("{field} is required")));
        }

        if value.contains('\0') {
            return Err(invalid(format!("{field} contains invalid characters")));
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(invalid("Email cannot be empty"));
        }

        if email.len() > 254 {
            return Err(invalid("Email too long (max 254 characters)"));
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(invalid("Email must have exactly one @ symbol"));
        }

        let local_part = parts[0];
        let domain_part = parts[1];

        if local_part.is_empty() || local_part.len() > 64 {
            return Err(invalid("Email local part invalid"));
        }

        if domain_part.is_empty() || !domain_part.contains('.') {
            return Err(invalid("Email domain invalid"));
        }

        Ok(())
    }

    /// A job needs a title and a company
    pub fn validate_job(job: &Job) -> Result<()> {
        Self::validate_id(&job.id)?;
        Self::validate_required("Job title", &job.title)?;
        Self::validate_required("Job company", &job.company)
    }

    /// A contact needs a name and a company
    pub fn validate_contact(contact: &Contact) -> Result<()> {
        Self::validate_id(&contact.id)?;
        Self::validate_required("Contact name", &contact.name)?;
        Self::validate_required("Contact company", &contact.company)?;
        if let Some(email) = contact.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Self::validate_email(email)?;
        }
        Ok(())
    }

    /// A company needs a name
    pub fn validate_company(company: &Company) -> Result<()> {
        Self::validate_id(&company.id)?;
        Self::validate_required("Company name", &company.name)
    }

    /// A task needs a title; post-call notes only go on calls and meetings
    pub fn validate_task(task: &Task) -> Result<()> {
        Self::validate_id(&task.id)?;
        Self::validate_required("Task title", &task.title)?;
        let has_notes = task.post_call_notes.as_deref().is_some_and(|notes| !notes.trim().is_empty());
        if let Some(kind) = task.kind.filter(|kind| has_notes && !kind.takes_post_call_notes()) {
            return Err(invalid(format!("Post-call notes are not allowed on {kind:?} tasks")));
        }
        Ok(())
    }

    /// A note needs content once sanitized
    pub fn validate_note(note: &NewNote) -> Result<()> {
        if Self::sanitize_text(&note.content).is_empty() {
            return Err(invalid("Note content cannot be empty"));
        }
        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_strips_controls() {
        assert_eq!(InputValidator::sanitize_text("  hi\u{0007} there \n"), "hi there");
    }

    #[test]
    fn test_required_rejects_whitespace() {
        assert!(InputValidator::validate_required("Title", "   ").is_err());
        assert!(InputValidator::validate_required("Title", "Engineer").is_ok());
    }
}
