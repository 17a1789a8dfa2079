// AddForm - state behind the "Add Task" overlay and `rstodo add`
use crate::api::{NewTodo, TodoApi};
use crate::constants::*;
use crate::model::TitleId;
use crate::session::Session;
use crate::util::is_blank;
use std::time::Duration;
use tracing::{error, info, warn};

/// Feedback line shown above the form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub text: String,
    pub is_error: bool,
}

impl FormMessage {
    fn error(text: &str) -> Self {
        FormMessage {
            text: text.to_string(),
            is_error: true,
        }
    }

    fn success(text: &str) -> Self {
        FormMessage {
            text: text.to_string(),
            is_error: false,
        }
    }
}

/// What happened on save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Required fields missing; nothing was sent
    Rejected,
    /// The request failed or the server reported no success; the form stays open
    Failed,
    /// Created. The form should close once `dismiss_after` has elapsed.
    Saved {
        new_title_id: Option<TitleId>,
        dismiss_after: Duration,
    },
}

/// A title plus an ordered, resizable list of sub-task entries.
///
/// Starts with one blank entry and never drops below one.
#[derive(Debug, Clone)]
pub struct AddForm {
    title: String,
    entries: Vec<String>,
    message: Option<FormMessage>,
}

impl Default for AddForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddForm {
    pub fn new() -> Self {
        AddForm {
            title: String::new(),
            entries: vec![String::new()],
            message: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn title_mut(&mut self) -> &mut String {
        &mut self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn entry_mut(&mut self, index: usize) -> Option<&mut String> {
        self.entries.get_mut(index)
    }

    pub fn set_entry(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = value.into();
                true
            }
            None => false,
        }
    }

    /// Appends a blank entry, returning its index
    pub fn add_entry(&mut self) -> usize {
        self.entries.push(String::new());
        self.entries.len() - 1
    }

    /// Removes an entry unless it is the last one left
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    /// Entries that will actually be sent, in order
    pub fn filled_entries(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !is_blank(e))
            .cloned()
            .collect()
    }

    /// Validates and submits the form.
    ///
    /// `on_added` runs once, with the new title's id, only when the server
    /// confirms the title was created.
    pub fn save<A, F>(&mut self, api: &A, session: Option<&Session>, on_added: F) -> SaveOutcome
    where
        A: TodoApi + ?Sized,
        F: FnOnce(Option<&TitleId>),
    {
        let lists = self.filled_entries();
        let session = match session {
            Some(s) if !is_blank(&self.title) && !lists.is_empty() => s,
            _ => {
                self.message = Some(FormMessage::error(MSG_FIELDS_REQUIRED));
                return SaveOutcome::Rejected;
            }
        };

        let todo = NewTodo {
            username: session.username.clone(),
            title: self.title.clone(),
            lists,
            status: false,
        };

        match api.add_todo(&todo) {
            Ok(response) if response.success => {
                info!(title = %todo.title, tasks = todo.lists.len(), "title created");
                self.message = Some(FormMessage::success(MSG_ADDED));
                on_added(response.new_title_id.as_ref());
                SaveOutcome::Saved {
                    new_title_id: response.new_title_id,
                    dismiss_after: ADD_DISMISS_DELAY,
                }
            }
            Ok(_) => {
                warn!(title = %todo.title, "server did not confirm the new title");
                self.message = Some(FormMessage::error(MSG_SAVE_FAILED));
                SaveOutcome::Failed
            }
            Err(e) => {
                error!(error = %e, "saving title failed");
                self.message = Some(FormMessage::error(MSG_SAVE_FAILED));
                SaveOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    fn session() -> Session {
        Session::new("ana")
    }

    #[test]
    fn test_starts_with_one_blank_entry() {
        let form = AddForm::new();
        assert_eq!(form.entries(), &[String::new()]);
        assert!(form.message().is_none());
    }

    #[test]
    fn test_keeps_at_least_one_entry() {
        let mut form = AddForm::new();
        assert!(!form.remove_entry(0));

        let second = form.add_entry();
        form.set_entry(second, "Eggs");
        assert!(form.remove_entry(0));
        assert_eq!(form.entries(), &["Eggs".to_string()]);
        assert!(!form.remove_entry(0));
        assert!(!form.remove_entry(5));
    }

    #[test]
    fn test_blank_title_sends_nothing() {
        let api = FakeApi::new();
        let mut form = AddForm::new();
        form.set_title("   ");
        form.set_entry(0, "Milk");

        let outcome = form.save(&api, Some(&session()), |_| panic!("must not be called"));
        assert_eq!(outcome, SaveOutcome::Rejected);
        assert_eq!(form.message().unwrap().text, MSG_FIELDS_REQUIRED);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_all_blank_entries_send_nothing() {
        let api = FakeApi::new();
        let mut form = AddForm::new();
        form.set_title("Groceries");
        let i = form.add_entry();
        form.set_entry(i, "  ");

        let outcome = form.save(&api, Some(&session()), |_| {});
        assert_eq!(outcome, SaveOutcome::Rejected);
        assert!(form.message().unwrap().is_error);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_requires_session() {
        let api = FakeApi::new();
        let mut form = AddForm::new();
        form.set_title("Groceries");
        form.set_entry(0, "Milk");

        assert_eq!(form.save(&api, None, |_| {}), SaveOutcome::Rejected);
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_save_sends_only_filled_entries() {
        let api = FakeApi::new();
        let mut form = AddForm::new();
        form.set_title("Groceries");
        form.set_entry(0, "Milk");
        form.add_entry();
        let i = form.add_entry();
        form.set_entry(i, "Eggs");

        let mut added = None;
        let outcome = form.save(&api, Some(&session()), |id| added = id.cloned());

        let title_id = added.expect("callback receives the new id");
        assert_eq!(
            outcome,
            SaveOutcome::Saved {
                new_title_id: Some(title_id.clone()),
                dismiss_after: Duration::from_secs(1),
            }
        );
        assert_eq!(form.message().unwrap().text, MSG_ADDED);

        let state = api.state();
        let descs: Vec<&str> = state
            .tasks
            .iter()
            .filter(|t| t.title_id == title_id)
            .map(|t| t.list_desc.as_str())
            .collect();
        assert_eq!(descs, vec!["Milk", "Eggs"]);
        assert!(state.tasks.iter().all(|t| !t.done));
    }

    #[test]
    fn test_failure_keeps_form_for_retry() {
        let api = FakeApi::new();
        api.state().offline = true;

        let mut form = AddForm::new();
        form.set_title("Groceries");
        form.set_entry(0, "Milk");

        assert_eq!(
            form.save(&api, Some(&session()), |_| panic!("not added")),
            SaveOutcome::Failed
        );
        assert_eq!(form.message().unwrap().text, MSG_SAVE_FAILED);
        assert_eq!(form.title(), "Groceries");

        api.state().offline = false;
        assert!(matches!(
            form.save(&api, Some(&session()), |_| {}),
            SaveOutcome::Saved { .. }
        ));
    }

    #[test]
    fn test_unconfirmed_add_is_a_failure() {
        let api = FakeApi::new();
        api.state().reject_adds = true;

        let mut form = AddForm::new();
        form.set_title("Groceries");
        form.set_entry(0, "Milk");

        assert_eq!(
            form.save(&api, Some(&session()), |_| panic!("not added")),
            SaveOutcome::Failed
        );
        assert!(form.message().unwrap().is_error);
    }
}
