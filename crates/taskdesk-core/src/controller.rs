//! Task state controller.
//!
//! Turns user intents into backend calls,
//! folds the answers into local state and
//! tells the renderer what to show. All
//! operations take `&self`; state sits in a
//! `RefCell` that is never held across an
//! `.await`, so several operations may be
//! in flight on one thread.
//!
//! List requests carry a generation number.
//! Only the newest one may reach the
//! renderer.

use std::cell::RefCell;

use taskdesk_shared::{
  Credentials,
  TaskCreate,
  TaskUpdate
};
use tracing::{
  debug,
  info,
  warn
};

use crate::backend::{
  BackendClient,
  Credential
};
use crate::error::{
  ControllerError,
  ErrorKind
};
use crate::filter::{
  FilterState,
  Scope
};
use crate::session::Session;
use crate::state::{
  ControllerState,
  EditingContext
};
use crate::task::{
  EditFields,
  NewTask,
  TagSet,
  Task
};
use crate::view::{
  AssistantPanel,
  ViewRenderer
};

pub const DELETE_PROMPT: &str =
  "Are you sure you want to delete this \
   task?";
const ASSISTANT_FAILURE: &str =
  "Sorry, I couldn't analyze your tasks \
   right now";

/// Result of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
  Applied(Vec<Task>),
  /// A newer request was issued before
  /// this one resolved.
  Superseded
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Deletion {
  Deleted,
  Declined
}

pub struct TaskStateController<B, V> {
  backend: B,
  view:    V,
  state:   RefCell<ControllerState>
}

impl<B, V> TaskStateController<B, V>
where
  B: BackendClient,
  V: ViewRenderer
{
  pub fn new(backend: B, view: V) -> Self {
    Self {
      backend,
      view,
      state: RefCell::new(
        ControllerState::default()
      )
    }
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub fn view(&self) -> &V {
    &self.view
  }

  pub fn session(
    &self
  ) -> Option<Session> {
    self.state.borrow().session.clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.state.borrow().session.is_some()
  }

  pub fn filter(&self) -> FilterState {
    self.state.borrow().filter.clone()
  }

  /// Tasks from the last applied list.
  pub fn tasks(&self) -> Vec<Task> {
    self.state.borrow().tasks.clone()
  }

  pub fn task(
    &self,
    task_id: u64
  ) -> Option<Task> {
    self
      .state
      .borrow()
      .tasks
      .iter()
      .find(|task| task.id == task_id)
      .cloned()
  }

  pub fn draft_tags(&self) -> TagSet {
    self.state.borrow().draft_tags.clone()
  }

  /// Snapshot held by the open edit, if
  /// any.
  pub fn editing(&self) -> Option<Task> {
    self
      .state
      .borrow()
      .editing
      .as_ref()
      .map(|ctx| ctx.task().clone())
  }

  fn fail(
    &self,
    context: &str,
    error: ControllerError
  ) -> ControllerError {
    warn!(context, %error, kind = ?error.kind(), "operation failed");
    self
      .view
      .show_notice(&error.notice(context), true);
    error
  }

  fn require_credential(
    &self,
    context: &str
  ) -> Result<Credential, ControllerError>
  {
    let credential =
      self.state.borrow().credential();
    credential.ok_or_else(|| {
      self.fail(
        context,
        ControllerError::unauthenticated()
      )
    })
  }

  #[tracing::instrument(skip(self, password))]
  pub async fn register(
    &self,
    username: &str,
    password: &str
  ) -> Result<(), ControllerError> {
    let credentials = Credentials {
      username: username.to_string(),
      password: password.to_string()
    };

    match self
      .backend
      .register(&credentials)
      .await
    {
      | Ok(()) => {
        info!(username, "registered");
        self.view.show_notice(
          "Registration successful! \
           Please login.",
          false
        );
        Ok(())
      }
      | Err(failure) => Err(self.fail(
        "Registration failed",
        failure.into_auth_error()
      ))
    }
  }

  #[tracing::instrument(skip(self, password))]
  pub async fn login(
    &self,
    username: &str,
    password: &str
  ) -> Result<Session, ControllerError> {
    let credentials = Credentials {
      username: username.to_string(),
      password: password.to_string()
    };

    let credential = self
      .backend
      .login(&credentials)
      .await
      .map_err(|failure| {
        self.fail(
          "Login failed",
          failure.into_auth_error()
        )
      })?;

    let session =
      Session::new(username, credential);
    {
      let mut state =
        self.state.borrow_mut();
      state.end_session();
      state.session = Some(session.clone());
    }
    info!(username, "logged in");

    self.view.render_task_list(&[]);
    self.view.render_draft_tags(&[]);
    self
      .view
      .show_authenticated_view(&session);
    self
      .view
      .show_notice("Login successful!", false);

    self.refetch().await;
    Ok(session)
  }

  pub fn logout(&self) {
    self.end_session();
    info!("logged out");
    self.view.show_notice("Logged out", false);
  }

  fn end_session(&self) {
    self.state.borrow_mut().end_session();
    self.view.close_edit_form();
    self.view.render_draft_tags(&[]);
    self.view.render_task_list(&[]);
    self.view.render_status_line("");
    self.view.show_unauthenticated_view();
  }

  /// Ends the session only if `credential`
  /// is still the active one; a newer login
  /// survives a late rejection.
  fn expire_session(
    &self,
    credential: Option<&Credential>
  ) {
    let current =
      self.state.borrow().credential();
    if credential.is_none()
      || current.as_ref() == credential
    {
      warn!("session rejected; returning to login");
      self.end_session();
    } else {
      debug!(
        "rejected credential is no longer \
         active"
      );
    }
  }

  pub fn add_draft_tag(
    &self,
    tag: &str
  ) -> Result<bool, ControllerError> {
    let inserted = self
      .state
      .borrow_mut()
      .draft_tags
      .insert(tag);
    let added = inserted.map_err(|error| {
      self.fail("Invalid tag", error)
    })?;

    let tags =
      self.state.borrow().draft_tags.to_vec();
    self.view.render_draft_tags(&tags);
    Ok(added)
  }

  pub fn remove_draft_tag(
    &self,
    tag: &str
  ) -> bool {
    let removed = self
      .state
      .borrow_mut()
      .draft_tags
      .remove(tag);
    let tags =
      self.state.borrow().draft_tags.to_vec();
    self.view.render_draft_tags(&tags);
    removed
  }

  #[tracing::instrument(skip(self))]
  pub async fn create_task(
    &self,
    new_task: NewTask
  ) -> Result<(), ControllerError> {
    const CONTEXT: &str =
      "Failed to create task";

    let title = new_task.title.trim();
    if title.is_empty() {
      return Err(self.fail(
        CONTEXT,
        ControllerError::EmptyTitle
      ));
    }
    let credential =
      self.require_credential(CONTEXT)?;

    let payload = TaskCreate {
      title:       title.to_string(),
      description: new_task.description,
      priority_id: new_task.priority.id(),
      tags:        self
        .state
        .borrow()
        .draft_tags
        .to_vec()
    };

    self
      .backend
      .create_task(&payload, &credential)
      .await
      .map_err(|failure| {
        self.fail(CONTEXT, failure.into())
      })?;

    // Tags typed while the request was in
    // flight stay in the draft.
    let remaining = {
      let mut state =
        self.state.borrow_mut();
      for tag in &payload.tags {
        state.draft_tags.remove(tag);
      }
      state.draft_tags.to_vec()
    };
    info!(title = %payload.title, tags = payload.tags.len(), "task created");
    self.view.render_draft_tags(&remaining);
    self.view.show_notice(
      "Task created successfully!",
      false
    );

    self.refetch().await;
    Ok(())
  }

  /// Fetches the list for `filter` and makes
  /// it the current filter.
  #[tracing::instrument(skip(self))]
  pub async fn list_tasks(
    &self,
    filter: FilterState
  ) -> Result<ListOutcome, ControllerError>
  {
    const CONTEXT: &str =
      "Failed to fetch tasks";

    let credential =
      self.require_credential(CONTEXT)?;
    let generation = {
      let mut state =
        self.state.borrow_mut();
      state.filter = filter.clone();
      state.issue_generation()
    };
    debug!(
      generation,
      scope = %filter.scope,
      "fetching tasks"
    );

    let result = match filter.scope {
      | Scope::All => {
        self
          .backend
          .list_all_tasks(&credential)
          .await
      }
      | Scope::Completed => {
        self
          .backend
          .list_completed_tasks(&credential)
          .await
      }
      | Scope::Incomplete => {
        self
          .backend
          .list_incomplete_tasks(
            &credential
          )
          .await
      }
    };

    if !self
      .state
      .borrow()
      .is_latest(generation)
    {
      debug!(
        generation,
        ok = result.is_ok(),
        "discarding superseded task list"
      );
      return Ok(ListOutcome::Superseded);
    }

    let fetched = result.map_err(|failure| {
      self.fail(CONTEXT, failure.into())
    })?;
    let total = fetched.len();
    let tasks = filter.apply(
      fetched
        .into_iter()
        .map(Task::from)
        .collect()
    );

    self.state.borrow_mut().tasks =
      tasks.clone();
    debug!(
      generation,
      shown = tasks.len(),
      total,
      "applied task list"
    );
    self.view.render_task_list(&tasks);
    self.view.render_status_line(
      &filter.status_line(tasks.len(), total)
    );
    Ok(ListOutcome::Applied(tasks))
  }

  /// Re-runs the current filter.
  pub async fn refresh(
    &self
  ) -> Result<ListOutcome, ControllerError>
  {
    let filter = self.filter();
    self.list_tasks(filter).await
  }

  /// Refresh scheduled by another
  /// operation. Failures were already
  /// shown.
  async fn refetch(&self) {
    if let Err(error) = self.refresh().await
    {
      debug!(%error, "follow-up refresh failed");
    }
  }

  pub async fn set_filter(
    &self,
    scope: Scope,
    username: Option<String>
  ) -> Result<ListOutcome, ControllerError>
  {
    self
      .list_tasks(FilterState::new(
        scope, username
      ))
      .await
  }

  /// Opens an edit on a copy of `task`,
  /// discarding any unsaved edit.
  pub fn open_edit(&self, task: &Task) {
    let replaced = self
      .state
      .borrow_mut()
      .editing
      .replace(EditingContext::new(task));
    if let Some(previous) = replaced {
      debug!(
        previous = previous.task_id(),
        "discarded unsaved edit"
      );
    }
    debug!(task_id = task.id, "editing task");
    self.view.open_edit_form(task);
  }

  pub fn revise_edit(
    &self,
    fields: EditFields
  ) -> Result<(), ControllerError> {
    let revised = {
      let mut state =
        self.state.borrow_mut();
      match state.editing.as_mut() {
        | Some(ctx) => {
          ctx.revise(fields);
          true
        }
        | None => false
      }
    };
    if revised {
      Ok(())
    } else {
      Err(self.fail(
        "Cannot edit task",
        ControllerError::NoEditInProgress
      ))
    }
  }

  pub fn add_edit_tag(
    &self,
    tag: &str
  ) -> Result<bool, ControllerError> {
    self.with_edit_tags(|tags| {
      tags.insert(tag)
    })
  }

  pub fn remove_edit_tag(
    &self,
    tag: &str
  ) -> Result<bool, ControllerError> {
    self.with_edit_tags(|tags| {
      Ok(tags.remove(tag))
    })
  }

  fn with_edit_tags<F>(
    &self,
    change: F
  ) -> Result<bool, ControllerError>
  where
    F: FnOnce(
      &mut TagSet
    )
      -> Result<bool, ControllerError>
  {
    let outcome = {
      let mut state =
        self.state.borrow_mut();
      state.editing.as_mut().map(|ctx| {
        change(ctx.tags_mut()).map(
          |changed| {
            (changed, ctx.task().clone())
          }
        )
      })
    };

    match outcome {
      | None => Err(self.fail(
        "Cannot edit task",
        ControllerError::NoEditInProgress
      )),
      | Some(Err(error)) => {
        Err(self.fail("Invalid tag", error))
      }
      | Some(Ok((changed, snapshot))) => {
        self.view.open_edit_form(&snapshot);
        Ok(changed)
      }
    }
  }

  #[tracing::instrument(skip(self))]
  pub async fn commit_edit(
    &self
  ) -> Result<(), ControllerError> {
    const CONTEXT: &str =
      "Failed to update task";

    let snapshot = self.editing();
    let Some(task) = snapshot else {
      return Err(self.fail(
        CONTEXT,
        ControllerError::NoEditInProgress
      ));
    };
    let title = task.title.trim();
    if title.is_empty() {
      return Err(self.fail(
        CONTEXT,
        ControllerError::EmptyTitle
      ));
    }
    let credential =
      self.require_credential(CONTEXT)?;

    let update = TaskUpdate {
      task_id:     task.id,
      title:       title.to_string(),
      description: task.description.clone(),
      priority_id: task.priority.id(),
      tags:        task.wire_tags()
    };

    self
      .backend
      .update_task(&update, &credential)
      .await
      .map_err(|failure| {
        self.fail(CONTEXT, failure.into())
      })?;

    let closed = {
      let mut state =
        self.state.borrow_mut();
      let same_edit = state
        .editing
        .as_ref()
        .is_some_and(|ctx| {
          ctx.task() == &task
        });
      if same_edit {
        state.editing = None;
      }
      same_edit
    };
    if closed {
      self.view.close_edit_form();
    } else {
      debug!(
        task_id = task.id,
        "edit changed while saving; \
         leaving form open"
      );
    }
    info!(task_id = task.id, "task updated");
    self.view.show_notice(
      "Task updated successfully!",
      false
    );

    self.refetch().await;
    Ok(())
  }

  pub fn cancel_edit(&self) {
    let cancelled =
      self.state.borrow_mut().editing.take();
    if let Some(ctx) = cancelled {
      debug!(
        task_id = ctx.task_id(),
        "edit cancelled"
      );
    }
    self.view.close_edit_form();
  }

  #[tracing::instrument(skip(self))]
  pub async fn delete_task(
    &self,
    task_id: u64
  ) -> Result<Deletion, ControllerError> {
    const CONTEXT: &str =
      "Failed to delete task";

    let credential =
      self.require_credential(CONTEXT)?;
    if !self.view.confirm(DELETE_PROMPT) {
      info!(task_id, "delete declined");
      return Ok(Deletion::Declined);
    }

    self
      .backend
      .delete_task(task_id, &credential)
      .await
      .map_err(|failure| {
        self.fail(CONTEXT, failure.into())
      })?;

    let was_editing = {
      let mut state =
        self.state.borrow_mut();
      let editing_deleted = state
        .editing
        .as_ref()
        .is_some_and(|ctx| {
          ctx.task_id() == task_id
        });
      if editing_deleted {
        state.editing = None;
      }
      editing_deleted
    };
    if was_editing {
      self.view.close_edit_form();
    }
    info!(task_id, "task deleted");
    self.view.show_notice(
      "Task deleted successfully!",
      false
    );

    self.refetch().await;
    Ok(Deletion::Deleted)
  }

  /// Shows `desired` right away and rolls
  /// the checkbox back if the backend does
  /// not confirm it.
  #[tracing::instrument(skip(self))]
  pub async fn toggle_completion(
    &self,
    task_id: u64,
    desired: bool
  ) -> Result<(), ControllerError> {
    const CONTEXT: &str =
      "Failed to update task";

    self
      .view
      .set_checkbox_state(task_id, desired);

    let credential =
      self.state.borrow().credential();
    let confirmed = match credential {
      | Some(credential) => self
        .backend
        .set_completion(
          task_id,
          desired,
          &credential
        )
        .await
        .map_err(ControllerError::from),
      | None => {
        Err(ControllerError::unauthenticated())
      }
    };

    if let Err(error) = confirmed {
      self
        .view
        .set_checkbox_state(task_id, !desired);
      return Err(self.fail(CONTEXT, error));
    }

    {
      let mut state =
        self.state.borrow_mut();
      if let Some(task) = state
        .tasks
        .iter_mut()
        .find(|task| task.id == task_id)
      {
        task.completed = desired;
      }
    }
    info!(task_id, completed = desired, "completion updated");
    self.view.show_notice(
      if desired {
        "Task marked as completed"
      } else {
        "Task marked as incomplete"
      },
      false
    );

    self.refetch().await;
    Ok(())
  }

  /// Sends a question about the user's
  /// tasks and returns the raw answer.
  #[tracing::instrument(skip(self))]
  pub async fn ask_assistant(
    &self,
    prompt: &str
  ) -> Result<String, ControllerError> {
    const CONTEXT: &str =
      "Failed to analyze tasks";

    let prompt = prompt.trim();
    if prompt.is_empty() {
      return Err(self.fail(
        CONTEXT,
        ControllerError::EmptyPrompt
      ));
    }

    let credential =
      self.state.borrow().credential();
    let Some(credential) = credential else {
      let error =
        ControllerError::unauthenticated();
      self.view.render_assistant(
        AssistantPanel::Failed(format!(
          "{ASSISTANT_FAILURE}: {error}"
        ))
      );
      self.expire_session(None);
      return Err(self.fail(CONTEXT, error));
    };

    self
      .view
      .render_assistant(AssistantPanel::Pending);
    match self
      .backend
      .analyze_tasks(prompt, &credential)
      .await
    {
      | Ok(answer) => {
        info!(chars = answer.len(), "assistant answered");
        self.view.render_assistant(
          AssistantPanel::Answer(
            answer.clone()
          )
        );
        Ok(answer)
      }
      | Err(failure) => {
        let error =
          ControllerError::from(failure);
        self.view.render_assistant(
          AssistantPanel::Failed(format!(
            "{ASSISTANT_FAILURE}: {error}"
          ))
        );
        if error.kind()
          == ErrorKind::Unauthenticated
        {
          self.expire_session(Some(
            &credential
          ));
        }
        Err(self.fail(CONTEXT, error))
      }
    }
  }
}
