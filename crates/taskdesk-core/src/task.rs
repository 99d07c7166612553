use std::fmt;

use serde::{
  Deserialize,
  Serialize
};
use taskdesk_shared::TaskDto;
use tracing::trace;

use crate::error::ControllerError;

/// Tag some backends use to mark
/// completion. Never kept in a task's
/// tag set and never accepted as user
/// input; the `completed` flag is
/// authoritative and the tag is written
/// back from it.
pub const DONE_TAG: &str = "Done";

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  High,
  #[default]
  Medium,
  Low
}

impl Priority {
  pub const ALL: [Priority; 3] = [
    Priority::High,
    Priority::Medium,
    Priority::Low
  ];

  pub fn id(self) -> u8 {
    match self {
      | Priority::High => 1,
      | Priority::Medium => 2,
      | Priority::Low => 3
    }
  }

  pub fn from_id(
    id: u8
  ) -> Option<Self> {
    Self::ALL
      .into_iter()
      .find(|priority| {
        priority.id() == id
      })
  }

  pub fn from_name(
    name: &str
  ) -> Option<Self> {
    match name
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "high" => Some(Priority::High),
      | "medium" => {
        Some(Priority::Medium)
      }
      | "low" => Some(Priority::Low),
      | _ => None
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Priority::High => "High",
      | Priority::Medium => "Medium",
      | Priority::Low => "Low"
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Priority {
  type Err = String;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::from_name(s)
      .or_else(|| {
        s.trim()
          .parse::<u8>()
          .ok()
          .and_then(Self::from_id)
      })
      .ok_or_else(|| {
        format!(
          "unknown priority: {s} \
           (expected high, medium or \
           low)"
        )
      })
  }
}

/// Insertion-ordered set of tags.
/// Values are trimmed; blanks are
/// rejected and duplicates ignored.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
  tags: Vec<String>
}

impl TagSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns `Ok(false)` when the tag is
  /// already present.
  pub fn insert(
    &mut self,
    tag: &str
  ) -> Result<bool, ControllerError> {
    let tag = tag.trim();
    if tag.is_empty() {
      return Err(
        ControllerError::EmptyTag
      );
    }
    if tag == DONE_TAG {
      return Err(
        ControllerError::ReservedTag
      );
    }
    if self.contains(tag) {
      trace!(tag, "tag already present");
      return Ok(false);
    }
    self.tags.push(tag.to_string());
    Ok(true)
  }

  pub fn remove(
    &mut self,
    tag: &str
  ) -> bool {
    let before = self.tags.len();
    self
      .tags
      .retain(|value| value != tag.trim());
    self.tags.len() != before
  }

  pub fn contains(
    &self,
    tag: &str
  ) -> bool {
    self
      .tags
      .iter()
      .any(|value| value == tag)
  }

  pub fn clear(&mut self) {
    self.tags.clear();
  }

  pub fn len(&self) -> usize {
    self.tags.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tags.is_empty()
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = &str> {
    self.tags.iter().map(String::as_str)
  }

  pub fn as_slice(&self) -> &[String] {
    &self.tags
  }

  pub fn to_vec(&self) -> Vec<String> {
    self.tags.clone()
  }
}

impl<S: AsRef<str>> FromIterator<S>
  for TagSet
{
  fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = S>
  {
    let mut set = TagSet::new();
    for tag in iter {
      // blanks from the wire are dropped
      let _ = set.insert(tag.as_ref());
    }
    set
  }
}

impl From<Vec<String>> for TagSet {
  fn from(tags: Vec<String>) -> Self {
    tags.into_iter().collect()
  }
}

impl From<TagSet> for Vec<String> {
  fn from(set: TagSet) -> Self {
    set.tags
  }
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct Task {
  pub id:          u64,
  pub title:       String,
  pub description: String,
  pub priority:    Priority,
  pub tags:        TagSet,
  pub completed:   bool,
  pub created_by:  Option<String>
}

impl Task {
  pub fn has_description(&self) -> bool {
    !self.description.trim().is_empty()
  }

  /// Tags as sent on update. A completed
  /// task carries `DONE_TAG` so backends
  /// that only read the tag keep it done.
  pub fn wire_tags(&self) -> Vec<String> {
    let mut tags = self.tags.to_vec();
    if self.completed {
      tags.push(DONE_TAG.to_string());
    }
    tags
  }
}

impl From<TaskDto> for Task {
  fn from(dto: TaskDto) -> Self {
    let priority = dto
      .priority_id
      .and_then(Priority::from_id)
      .or_else(|| {
        dto
          .priority
          .as_deref()
          .and_then(Priority::from_name)
      })
      .unwrap_or_default();

    let done_tagged = dto
      .tags
      .iter()
      .any(|tag| tag.trim() == DONE_TAG);
    let completed =
      dto.completed.unwrap_or(done_tagged);

    let tags = dto
      .tags
      .iter()
      .filter(|tag| tag.trim() != DONE_TAG)
      .collect::<TagSet>();

    Task {
      id: dto.id,
      title: dto.title,
      description: dto
        .description
        .unwrap_or_default(),
      priority,
      tags,
      completed,
      created_by: dto.created_by
    }
  }
}

/// Input of the create form. Tags come
/// from the controller's draft set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
  pub title:       String,
  pub description: String,
  pub priority:    Priority
}

/// Field values typed into the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFields {
  pub title:       String,
  pub description: String,
  pub priority:    Priority
}
