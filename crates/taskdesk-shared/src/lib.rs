use serde::{
  Deserialize,
  Serialize
};

/// Request paths of the task backend.
pub mod endpoints {
  pub const REGISTER: &str =
    "/register";
  pub const LOGIN: &str = "/login";
  pub const TASKS: &str = "/tasks";
  pub const TASKS_ALL: &str =
    "/tasks/user";
  pub const TASKS_COMPLETED: &str =
    "/tasks/completed";
  pub const TASKS_INCOMPLETE: &str =
    "/tasks/incomplete";
  pub const TASKS_UPDATE: &str =
    "/tasks/update";
  pub const TASKS_DELETE: &str =
    "/tasks/delete";
  pub const TASKS_COMPLETE: &str =
    "/tasks/complete";
  pub const TASKS_ANALYZE: &str =
    "/api/tasks/analyze";
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct Credentials {
  pub username: String,
  pub password: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct LoginResponse {
  pub access_token: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct MessageResponse {
  #[serde(default)]
  pub message: Option<String>
}

/// Failure body. Application errors use
/// `error`, the token layer uses `msg`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct ErrorBody {
  #[serde(default)]
  pub error: Option<String>,
  #[serde(default)]
  pub msg:   Option<String>
}

impl ErrorBody {
  pub fn message(&self) -> Option<&str> {
    self
      .error
      .as_deref()
      .or(self.msg.as_deref())
      .filter(|text| {
        !text.trim().is_empty()
      })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskDto {
  pub id:          u64,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub priority:    Option<String>,
  #[serde(default)]
  pub priority_id: Option<u8>,
  #[serde(default)]
  pub tags:        Vec<String>,
  #[serde(
    default,
    alias = "is_completed"
  )]
  pub completed:   Option<bool>,
  #[serde(default)]
  pub created_by:  Option<String>
}

/// Listing payload. The per-user route
/// wraps tasks in an envelope, the
/// others answer with a bare array.
#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
#[serde(untagged)]
pub enum TaskListing {
  Envelope {
    #[serde(default)]
    task_count: Option<usize>,
    tasks:      Vec<TaskDto>
  },
  Bare(Vec<TaskDto>)
}

impl TaskListing {
  pub fn into_tasks(
    self
  ) -> Vec<TaskDto> {
    match self {
      | TaskListing::Envelope {
        tasks,
        ..
      } => tasks,
      | TaskListing::Bare(tasks) => {
        tasks
      }
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct UserTasksArgs {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub username: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskCreate {
  pub title:       String,
  pub description: String,
  pub priority_id: u8,
  pub tags:        Vec<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct TaskUpdate {
  pub task_id:     u64,
  pub title:       String,
  pub description: String,
  pub priority_id: u8,
  pub tags:        Vec<String>
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct TaskIdArg {
  pub task_id: u64
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct CompletionArgs {
  pub task_id:   u64,
  pub completed: bool
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct AnalyzeArgs {
  pub prompt: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct AnalyzeResponse {
  pub response: String
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn listing_accepts_envelope_and_bare_array()
   {
    let envelope = r#"{"task_count":1,"tasks":[{"id":3,"title":"Buy milk","priority":"Medium","tags":["errand"],"created_by":"ada"}]}"#;
    let bare = r#"[{"id":4,"title":"Walk","tags":[]}]"#;

    let tasks = serde_json::from_str::<
      TaskListing,
    >(envelope)
    .expect("envelope")
    .into_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(
      tasks[0].created_by.as_deref(),
      Some("ada")
    );

    let tasks = serde_json::from_str::<
      TaskListing,
    >(bare)
    .expect("bare")
    .into_tasks();
    assert_eq!(tasks[0].id, 4);
    assert_eq!(tasks[0].description, None);
  }

  #[test]
  fn completion_flag_accepts_legacy_name()
   {
    let dto: TaskDto = serde_json::from_str(
      r#"{"id":1,"title":"x","is_completed":true}"#,
    )
    .expect("task");
    assert_eq!(dto.completed, Some(true));
  }

  #[test]
  fn error_body_prefers_application_message()
   {
    let body: ErrorBody = serde_json::from_str(
      r#"{"error":"Username already taken","msg":"ignored"}"#,
    )
    .expect("body");
    assert_eq!(
      body.message(),
      Some("Username already taken")
    );

    let body: ErrorBody = serde_json::from_str(
      r#"{"msg":"Missing Authorization Header"}"#,
    )
    .expect("body");
    assert_eq!(
      body.message(),
      Some("Missing Authorization Header")
    );

    assert_eq!(
      ErrorBody::default().message(),
      None
    );
  }

  #[test]
  fn user_tasks_args_omit_missing_username()
   {
    let json = serde_json::to_string(
      &UserTasksArgs::default()
    )
    .expect("encode");
    assert_eq!(json, "{}");
  }
}
