//! Renderer that turns controller
//! instructions into reducer actions.
//!
//! The controller never touches the DOM.
//! It calls [`YewView`], which dispatches
//! a [`UiAction`]; Yew re-renders from the
//! resulting [`UiState`].

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use taskdesk_core::{
  AssistantPanel,
  Session,
  Task,
  ViewRenderer
};
use yew::{
  Reducible,
  UseReducerDispatcher
};

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
  pub id:       u64,
  pub message:  String,
  pub is_error: bool
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
  pub username:   Option<String>,
  pub tasks:      Vec<Task>,
  /// Checkbox values shown ahead of the
  /// next list render.
  pub checkboxes: HashMap<u64, bool>,
  pub status:     String,
  pub draft_tags: Vec<String>,
  pub editing:    Option<Task>,
  pub assistant:  AssistantPanel,
  pub notice:     Option<Notice>
}

impl Default for UiState {
  fn default() -> Self {
    Self {
      username:   None,
      tasks:      vec![],
      checkboxes: HashMap::new(),
      status:     String::new(),
      draft_tags: vec![],
      editing:    None,
      assistant:  AssistantPanel::Idle,
      notice:     None
    }
  }
}

impl UiState {
  pub fn is_checked(
    &self,
    task: &Task
  ) -> bool {
    self
      .checkboxes
      .get(&task.id)
      .copied()
      .unwrap_or(task.completed)
  }
}

#[derive(Debug, Clone)]
pub enum UiAction {
  Notice(Notice),
  DismissNotice(u64),
  Authenticated(String),
  Unauthenticated,
  Tasks(Vec<Task>),
  Status(String),
  DraftTags(Vec<String>),
  EditOpened(Task),
  EditClosed,
  Checkbox(u64, bool),
  Assistant(AssistantPanel)
}

impl Reducible for UiState {
  type Action = UiAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    match action {
      | UiAction::Notice(notice) => {
        next.notice = Some(notice);
      }
      | UiAction::DismissNotice(id) => {
        // A newer notice keeps its own
        // timer.
        if next
          .notice
          .as_ref()
          .is_some_and(|n| n.id == id)
        {
          next.notice = None;
        } else {
          return self;
        }
      }
      | UiAction::Authenticated(
        username
      ) => {
        next.username = Some(username);
      }
      | UiAction::Unauthenticated => {
        next.username = None;
        next.assistant =
          AssistantPanel::Idle;
      }
      | UiAction::Tasks(tasks) => {
        next.tasks = tasks;
        next.checkboxes.clear();
      }
      | UiAction::Status(status) => {
        next.status = status;
      }
      | UiAction::DraftTags(tags) => {
        next.draft_tags = tags;
      }
      | UiAction::EditOpened(task) => {
        next.editing = Some(task);
      }
      | UiAction::EditClosed => {
        next.editing = None;
      }
      | UiAction::Checkbox(
        task_id,
        checked
      ) => {
        next
          .checkboxes
          .insert(task_id, checked);
      }
      | UiAction::Assistant(panel) => {
        next.assistant = panel;
      }
    }
    Rc::new(next)
  }
}

pub struct YewView {
  dispatcher:        UseReducerDispatcher<
    UiState
  >,
  notice_timeout_ms: u32,
  notice_seq:        Cell<u64>
}

impl YewView {
  pub fn new(
    dispatcher: UseReducerDispatcher<
      UiState
    >,
    notice_timeout_ms: u32
  ) -> Self {
    Self {
      dispatcher,
      notice_timeout_ms,
      notice_seq: Cell::new(0)
    }
  }

  fn send(&self, action: UiAction) {
    self.dispatcher.dispatch(action);
  }
}

impl ViewRenderer for YewView {
  fn show_notice(
    &self,
    message: &str,
    is_error: bool
  ) {
    let id = self.notice_seq.get() + 1;
    self.notice_seq.set(id);
    if is_error {
      tracing::warn!(message, "notice");
    } else {
      tracing::info!(message, "notice");
    }
    self.send(UiAction::Notice(Notice {
      id,
      message: message.to_string(),
      is_error
    }));

    let dispatcher =
      self.dispatcher.clone();
    let timeout = self.notice_timeout_ms;
    wasm_bindgen_futures::spawn_local(
      async move {
        TimeoutFuture::new(timeout).await;
        dispatcher.dispatch(
          UiAction::DismissNotice(id)
        );
      }
    );
  }

  fn show_authenticated_view(
    &self,
    session: &Session
  ) {
    self.send(UiAction::Authenticated(
      session.username().to_string()
    ));
  }

  fn show_unauthenticated_view(&self) {
    self.send(UiAction::Unauthenticated);
  }

  fn render_task_list(
    &self,
    tasks: &[Task]
  ) {
    self.send(UiAction::Tasks(
      tasks.to_vec()
    ));
  }

  fn render_status_line(
    &self,
    message: &str
  ) {
    self.send(UiAction::Status(
      message.to_string()
    ));
  }

  fn render_draft_tags(
    &self,
    tags: &[String]
  ) {
    self.send(UiAction::DraftTags(
      tags.to_vec()
    ));
  }

  fn open_edit_form(&self, task: &Task) {
    self.send(UiAction::EditOpened(
      task.clone()
    ));
  }

  fn close_edit_form(&self) {
    self.send(UiAction::EditClosed);
  }

  fn set_checkbox_state(
    &self,
    task_id: u64,
    checked: bool
  ) {
    self.send(UiAction::Checkbox(
      task_id, checked
    ));
  }

  fn render_assistant(
    &self,
    panel: AssistantPanel
  ) {
    self.send(UiAction::Assistant(panel));
  }

  fn confirm(&self, prompt: &str) -> bool {
    gloo::dialogs::confirm(prompt)
  }
}
