use crate::backend::Credential;

/// Authenticated user. Replaced as a whole
/// on login and logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  username:   String,
  credential: Credential
}

impl Session {
  pub fn new(
    username: impl Into<String>,
    credential: Credential
  ) -> Self {
    Self {
      username: username.into(),
      credential
    }
  }

  pub fn username(&self) -> &str {
    &self.username
  }

  pub fn credential(
    &self
  ) -> &Credential {
    &self.credential
  }
}
