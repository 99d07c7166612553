use std::fmt;

use tracing::trace;

use crate::task::Task;

/// Which listing route a fetch uses.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum Scope {
  #[default]
  All,
  Completed,
  Incomplete
}

impl Scope {
  pub fn as_key(self) -> &'static str {
    match self {
      | Scope::All => "all",
      | Scope::Completed => "completed",
      | Scope::Incomplete => "incomplete"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Some(Scope::All),
      | "completed" | "done" => {
        Some(Scope::Completed)
      }
      | "incomplete" | "open"
      | "pending" => {
        Some(Scope::Incomplete)
      }
      | _ => None
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

impl std::str::FromStr for Scope {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::from_key(s).ok_or_else(|| {
      format!(
        "unknown scope: {s} (expected \
         all, completed or incomplete)"
      )
    })
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Default,
)]
pub struct FilterState {
  pub scope:    Scope,
  pub username: Option<String>
}

impl FilterState {
  pub fn new(
    scope: Scope,
    username: Option<String>
  ) -> Self {
    let username = username
      .map(|name| name.trim().to_string())
      .filter(|name| !name.is_empty());
    Self {
      scope,
      username
    }
  }

  pub fn scope(scope: Scope) -> Self {
    Self::new(scope, None)
  }

  /// Narrows a freshly fetched list to the
  /// configured creator. Exact match.
  pub fn apply(
    &self,
    tasks: Vec<Task>
  ) -> Vec<Task> {
    let Some(username) =
      self.username.as_deref()
    else {
      return tasks;
    };

    let total = tasks.len();
    let kept = tasks
      .into_iter()
      .filter(|task| {
        task.created_by.as_deref()
          == Some(username)
      })
      .collect::<Vec<_>>();
    trace!(
      username,
      total,
      kept = kept.len(),
      "applied username filter"
    );
    kept
  }

  pub fn status_line(
    &self,
    shown: usize,
    total: usize
  ) -> String {
    let noun = |count: usize| {
      if count == 1 { "task" } else { "tasks" }
    };
    let scope = match self.scope {
      | Scope::All => "",
      | Scope::Completed => " completed",
      | Scope::Incomplete => {
        " incomplete"
      }
    };

    match self.username.as_deref() {
      | Some(username) => format!(
        "Showing {shown} of {total}{scope} \
         {} created by {username}",
        noun(total)
      ),
      | None => format!(
        "Showing {shown}{scope} {}",
        noun(shown)
      )
    }
  }
}
