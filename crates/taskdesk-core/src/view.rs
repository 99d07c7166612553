use crate::session::Session;
use crate::task::Task;

/// Default lifetime of a notice.
pub const NOTICE_TIMEOUT_MS: u32 = 3_000;

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum AssistantPanel {
  Idle,
  Pending,
  Answer(String),
  Failed(String)
}

/// Surface the controller drives. Calls
/// are fire-and-forget; the renderer owns
/// layout and timers.
pub trait ViewRenderer {
  /// Transient message, dismissed by the
  /// renderer after its notice timeout.
  fn show_notice(
    &self,
    message: &str,
    is_error: bool
  );

  fn show_authenticated_view(
    &self,
    session: &Session
  );

  fn show_unauthenticated_view(&self);

  fn render_task_list(
    &self,
    tasks: &[Task]
  );

  fn render_status_line(
    &self,
    message: &str
  );

  fn render_draft_tags(
    &self,
    tags: &[String]
  );

  fn open_edit_form(&self, task: &Task);

  fn close_edit_form(&self);

  fn set_checkbox_state(
    &self,
    task_id: u64,
    checked: bool
  );

  fn render_assistant(
    &self,
    panel: AssistantPanel
  );

  /// Yes/no gate for destructive
  /// actions.
  fn confirm(&self, prompt: &str) -> bool;
}
