//! Capability the controller uses to reach
//! the task backend.
//!
//! Implementations own the transport; the
//! controller only sees typed payloads and
//! [`BackendFailure`] values. The helpers
//! at the bottom turn raw HTTP answers into
//! those values so every client maps
//! statuses the same way.

use std::fmt;

use serde::de::DeserializeOwned;
use taskdesk_shared::{
  Credentials,
  ErrorBody,
  TaskCreate,
  TaskDto,
  TaskUpdate
};
use thiserror::Error;

/// Opaque bearer token. Never parsed and
/// never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
  pub fn new(
    token: impl Into<String>
  ) -> Self {
    Self(token.into())
  }

  pub fn bearer(&self) -> String {
    format!("Bearer {}", self.0)
  }
}

impl fmt::Debug for Credential {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str("Credential(***)")
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum BackendFailure {
  /// Request never produced a usable
  /// answer.
  #[error("{0}")]
  Transport(String),

  /// Credential missing, expired or
  /// rejected.
  #[error("{0}")]
  Unauthorized(String),

  #[error("{message}")]
  Server {
    status:  u16,
    message: String
  }
}

impl BackendFailure {
  /// Login and registration answer 401
  /// for bad passwords; that is a plain
  /// server error there, not a session
  /// problem.
  pub fn into_auth_error(
    self
  ) -> crate::error::ControllerError {
    match self {
      | BackendFailure::Unauthorized(
        message
      ) => {
        crate::error::ControllerError::Server(
          message
        )
      }
      | other => other.into()
    }
  }
}

#[allow(async_fn_in_trait)]
pub trait BackendClient {
  async fn register(
    &self,
    credentials: &Credentials
  ) -> Result<(), BackendFailure>;

  async fn login(
    &self,
    credentials: &Credentials
  ) -> Result<Credential, BackendFailure>;

  async fn create_task(
    &self,
    task: &TaskCreate,
    credential: &Credential
  ) -> Result<(), BackendFailure>;

  async fn list_all_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>;

  async fn list_completed_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>;

  async fn list_incomplete_tasks(
    &self,
    credential: &Credential
  ) -> Result<Vec<TaskDto>, BackendFailure>;

  async fn update_task(
    &self,
    update: &TaskUpdate,
    credential: &Credential
  ) -> Result<(), BackendFailure>;

  async fn delete_task(
    &self,
    task_id: u64,
    credential: &Credential
  ) -> Result<(), BackendFailure>;

  async fn set_completion(
    &self,
    task_id: u64,
    completed: bool,
    credential: &Credential
  ) -> Result<(), BackendFailure>;

  async fn analyze_tasks(
    &self,
    prompt: &str,
    credential: &Credential
  ) -> Result<String, BackendFailure>;
}

pub fn is_success(status: u16) -> bool {
  (200..300).contains(&status)
}

/// Maps a non-success answer. 401 and 422
/// come from the token layer.
pub fn failure_from_response(
  status: u16,
  body: &str
) -> BackendFailure {
  let parsed =
    serde_json::from_str::<ErrorBody>(
      body
    )
    .unwrap_or_default();
  let message = parsed
    .message()
    .map(ToString::to_string)
    .unwrap_or_else(|| {
      format!(
        "Request failed with status \
         {status}"
      )
    });

  match status {
    | 401 | 422 => {
      BackendFailure::Unauthorized(
        message
      )
    }
    | _ => BackendFailure::Server {
      status,
      message
    }
  }
}

/// Decodes a success body, or maps the
/// failure when the status says so.
pub fn decode_response<T>(
  status: u16,
  body: &str
) -> Result<T, BackendFailure>
where
  T: DeserializeOwned
{
  if !is_success(status) {
    return Err(failure_from_response(
      status, body
    ));
  }
  serde_json::from_str(body).map_err(
    |e| {
      BackendFailure::Transport(format!(
        "decode error: {e}"
      ))
    }
  )
}

/// Like [`decode_response`] for calls
/// whose success body is ignored.
pub fn expect_success(
  status: u16,
  body: &str
) -> Result<(), BackendFailure> {
  if is_success(status) {
    Ok(())
  } else {
    Err(failure_from_response(
      status, body
    ))
  }
}

#[cfg(test)]
mod tests {
  use taskdesk_shared::LoginResponse;

  use super::*;

  #[test]
  fn credential_debug_is_redacted() {
    let credential =
      Credential::new("secret.jwt.value");
    assert_eq!(
      format!("{credential:?}"),
      "Credential(***)"
    );
    assert_eq!(
      credential.bearer(),
      "Bearer secret.jwt.value"
    );
  }

  #[test]
  fn token_layer_statuses_are_unauthorized()
   {
    assert_eq!(
      failure_from_response(
        401,
        r#"{"msg":"Missing Authorization Header"}"#
      ),
      BackendFailure::Unauthorized(
        "Missing Authorization Header"
          .to_string()
      )
    );
    assert!(matches!(
      failure_from_response(422, "{}"),
      BackendFailure::Unauthorized(_)
    ));
  }

  #[test]
  fn server_failure_falls_back_to_status_text()
   {
    assert_eq!(
      failure_from_response(
        500,
        "<html>oops</html>"
      ),
      BackendFailure::Server {
        status:  500,
        message: "Request failed with \
                  status 500"
          .to_string()
      }
    );
  }

  #[test]
  fn decode_reports_bad_bodies_as_transport()
   {
    let decoded: Result<
      LoginResponse,
      _
    > = decode_response(200, "not json");
    assert!(matches!(
      decoded,
      Err(BackendFailure::Transport(_))
    ));

    let decoded: LoginResponse =
      decode_response(
        200,
        r#"{"access_token":"t"}"#
      )
      .expect("login body");
    assert_eq!(decoded.access_token, "t");
  }

  #[test]
  fn bad_password_is_a_server_error() {
    let err = BackendFailure::Unauthorized(
      "Invalid credentials".to_string()
    )
    .into_auth_error();
    assert_eq!(
      err,
      crate::error::ControllerError::Server(
        "Invalid credentials".to_string()
      )
    );
  }
}
