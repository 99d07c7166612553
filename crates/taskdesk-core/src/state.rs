use crate::backend::Credential;
use crate::filter::FilterState;
use crate::session::Session;
use crate::task::{
  EditFields,
  TagSet,
  Task
};

/// Snapshot of the task being edited. Owns
/// its own copy, tags included, so list
/// refreshes never leak into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingContext {
  task: Task
}

impl EditingContext {
  pub fn new(task: &Task) -> Self {
    Self {
      task: task.clone()
    }
  }

  pub fn task_id(&self) -> u64 {
    self.task.id
  }

  pub fn task(&self) -> &Task {
    &self.task
  }

  pub fn tags_mut(
    &mut self
  ) -> &mut TagSet {
    &mut self.task.tags
  }

  pub fn revise(
    &mut self,
    fields: EditFields
  ) {
    self.task.title = fields.title;
    self.task.description =
      fields.description;
    self.task.priority = fields.priority;
  }
}

/// Everything the controller mutates.
/// Borrowed only between awaits.
#[derive(Debug, Default)]
pub struct ControllerState {
  pub session:    Option<Session>,
  pub tasks:      Vec<Task>,
  pub draft_tags: TagSet,
  pub editing:    Option<EditingContext>,
  pub filter:     FilterState,
  generation:     u64
}

impl ControllerState {
  pub fn credential(
    &self
  ) -> Option<Credential> {
    self
      .session
      .as_ref()
      .map(|session| {
        session.credential().clone()
      })
  }

  /// Starts a list request and returns its
  /// generation.
  pub fn issue_generation(
    &mut self
  ) -> u64 {
    self.generation =
      self.generation.wrapping_add(1);
    self.generation
  }

  pub fn is_latest(
    &self,
    generation: u64
  ) -> bool {
    self.generation == generation
  }

  /// Drops everything tied to the session.
  /// In-flight list responses become
  /// stale.
  pub fn end_session(&mut self) {
    self.session = None;
    self.tasks.clear();
    self.draft_tags.clear();
    self.editing = None;
    self.filter = FilterState::default();
    self.issue_generation();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::task::Priority;

  #[test]
  fn only_newest_generation_is_latest() {
    let mut state =
      ControllerState::default();
    let first = state.issue_generation();
    let second = state.issue_generation();
    assert!(!state.is_latest(first));
    assert!(state.is_latest(second));

    state.end_session();
    assert!(!state.is_latest(second));
  }

  #[test]
  fn editing_context_owns_its_copy() {
    let mut live = Task {
      id:          1,
      title:       "Buy milk".to_string(),
      description: String::new(),
      priority:    Priority::Medium,
      tags:        ["errand"]
        .into_iter()
        .collect(),
      completed:   false,
      created_by:  None
    };
    let mut ctx = EditingContext::new(&live);

    live.title = "Buy bread".to_string();
    live.tags.clear();
    assert_eq!(ctx.task().title, "Buy milk");
    assert_eq!(
      ctx.task().tags.as_slice(),
      ["errand"]
    );

    ctx
      .tags_mut()
      .insert("dairy")
      .expect("tag");
    assert!(live.tags.is_empty());
  }
}
