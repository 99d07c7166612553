pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod session;
pub mod state;
pub mod task;
pub mod view;

pub use backend::{
  BackendClient,
  BackendFailure,
  Credential
};
pub use config::Config;
pub use controller::{
  Deletion,
  ListOutcome,
  TaskStateController
};
pub use error::{
  ControllerError,
  ErrorKind
};
pub use filter::{
  FilterState,
  Scope
};
pub use session::Session;
pub use task::{
  EditFields,
  NewTask,
  Priority,
  TagSet,
  Task
};
pub use view::{
  AssistantPanel,
  ViewRenderer
};
