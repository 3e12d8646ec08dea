//! In-memory conversation history
//!
//! Entries are appended exactly once, at submission time, and mutated in
//! place as their pipeline stages complete. They are never reordered or
//! removed, and they do not survive a restart.

use crate::models::{Submission, SubmissionStatus};

#[derive(Debug, Default)]
pub struct ConversationHistory {
    entries: Vec<Submission>,
    next_id: u64,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new submission and returns a snapshot of it
    pub fn append(&mut self, prompt: &str) -> Submission {
        let id = self.next_id;
        self.next_id += 1;
        let submission = Submission::new(id, prompt);
        self.entries.push(submission.clone());
        submission
    }

    pub fn entries(&self) -> &[Submission] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies `update` to the entry with the given id and returns the
    /// updated snapshot. Terminal entries are left untouched.
    fn update<F: FnOnce(&mut Submission)>(&mut self, id: u64, update: F) -> Option<Submission> {
        let entry = self.entries.iter_mut().find(|s| s.id == id)?;
        if entry.status.is_terminal() {
            return None;
        }
        update(entry);
        Some(entry.clone())
    }

    pub fn set_optimizing(&mut self, id: u64) -> Option<Submission> {
        self.update(id, |s| s.status = SubmissionStatus::Optimizing)
    }

    pub fn set_generating(&mut self, id: u64, enhanced_prompt: &str) -> Option<Submission> {
        self.update(id, |s| {
            s.enhanced_prompt = Some(enhanced_prompt.to_string());
            s.status = SubmissionStatus::Generating;
        })
    }

    pub fn resolve(&mut self, id: u64, image_url: &str) -> Option<Submission> {
        self.update(id, |s| {
            s.image_url = Some(image_url.to_string());
            s.status = SubmissionStatus::Resolved;
        })
    }

    pub fn fail(&mut self, id: u64, message: &str) -> Option<Submission> {
        self.update(id, |s| {
            s.error = Some(message.to_string());
            s.status = SubmissionStatus::Failed;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_sequential_ids_in_order() {
        let mut history = ConversationHistory::new();
        let first = history.append("a red fox in snow");
        let second = history.append("a lighthouse at dusk");

        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].prompt, "a red fox in snow");
        assert_eq!(history.entries()[1].prompt, "a lighthouse at dusk");
    }

    #[test]
    fn test_stages_mutate_entry_in_place() {
        let mut history = ConversationHistory::new();
        let id = history.append("a red fox in snow").id;

        let optimizing = history.set_optimizing(id).unwrap();
        assert_eq!(optimizing.status, SubmissionStatus::Optimizing);

        let generating = history.set_generating(id, "A majestic red fox...").unwrap();
        assert_eq!(generating.status, SubmissionStatus::Generating);
        assert_eq!(
            generating.enhanced_prompt.as_deref(),
            Some("A majestic red fox...")
        );

        let resolved = history.resolve(id, "https://img/1.png").unwrap();
        assert_eq!(resolved.status, SubmissionStatus::Resolved);
        assert_eq!(resolved.image_url.as_deref(), Some("https://img/1.png"));

        // Still exactly one entry; it was updated, not re-appended
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_terminal_entries_are_immutable() {
        let mut history = ConversationHistory::new();
        let id = history.append("a red fox in snow").id;
        history.resolve(id, "https://img/1.png").unwrap();

        assert!(history.fail(id, "late error").is_none());
        assert_eq!(history.entries()[0].status, SubmissionStatus::Resolved);
        assert!(history.entries()[0].error.is_none());
    }

    #[test]
    fn test_failure_records_error_line() {
        let mut history = ConversationHistory::new();
        let id = history.append("a red fox in snow").id;
        let failed = history
            .fail(id, "Error: HTTP error 429: insufficient_quota")
            .unwrap();
        assert_eq!(failed.status, SubmissionStatus::Failed);
        assert!(failed.error.unwrap().contains("insufficient_quota"));
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut history = ConversationHistory::new();
        assert!(history.set_optimizing(42).is_none());
        assert!(history.is_empty());
    }
}
