use thiserror::Error;

use crate::backend::BackendFailure;

/// Shown when a protected operation runs
/// without a session.
pub const NOT_LOGGED_IN: &str =
  "No authentication token found. \
   Please log in again.";

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ErrorKind {
  Validation,
  Unauthenticated,
  Transport,
  Server
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum ControllerError {
  #[error(
    "Please enter a question about \
     your tasks"
  )]
  EmptyPrompt,

  #[error("Tag cannot be empty")]
  EmptyTag,

  #[error(
    "\"Done\" is reserved; mark the task \
     completed instead"
  )]
  ReservedTag,

  #[error("Title cannot be empty")]
  EmptyTitle,

  #[error("No task is being edited")]
  NoEditInProgress,

  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  Transport(String),

  #[error("{0}")]
  Server(String)
}

impl ControllerError {
  pub fn unauthenticated() -> Self {
    ControllerError::Unauthenticated(
      NOT_LOGGED_IN.to_string()
    )
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      | ControllerError::EmptyPrompt
      | ControllerError::EmptyTag
      | ControllerError::ReservedTag
      | ControllerError::EmptyTitle
      | ControllerError::NoEditInProgress => {
        ErrorKind::Validation
      }
      | ControllerError::Unauthenticated(
        _
      ) => ErrorKind::Unauthenticated,
      | ControllerError::Transport(_) => {
        ErrorKind::Transport
      }
      | ControllerError::Server(_) => {
        ErrorKind::Server
      }
    }
  }

  /// Notice text for a failed operation.
  /// Server messages are passed through
  /// verbatim.
  pub fn notice(
    &self,
    context: &str
  ) -> String {
    match self {
      | ControllerError::Server(message) => {
        message.clone()
      }
      | ControllerError::Transport(
        reason
      ) => format!("{context}: {reason}"),
      | other => other.to_string()
    }
  }
}

impl From<BackendFailure>
  for ControllerError
{
  fn from(failure: BackendFailure) -> Self {
    match failure {
      | BackendFailure::Transport(
        reason
      ) => ControllerError::Transport(
        reason
      ),
      | BackendFailure::Unauthorized(
        message
      ) => ControllerError::Unauthenticated(
        message
      ),
      | BackendFailure::Server {
        message,
        ..
      } => ControllerError::Server(message)
    }
  }
}
