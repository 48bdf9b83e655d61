//! The closed set of record kinds and their fixed queue/table mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three fixed record shapes.
///
/// Every kind maps to exactly one queue and exactly one table. The mapping is
/// total and never changes at runtime.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
  Trigger,
  Action,
  Overall,
}

impl Kind {
  /// All kinds, in the order a sync cycle processes them.
  pub const ALL: [Kind; 3] = [Kind::Trigger, Kind::Action, Kind::Overall];

  /// Name of the list this kind is buffered in.
  pub fn queue_name(self) -> &'static str {
    match self {
      Kind::Trigger => "health-triggers",
      Kind::Action => "health-actions",
      Kind::Overall => "health-overall",
    }
  }

  /// Name of the table rows of this kind land in.
  pub fn table_name(self) -> &'static str {
    match self {
      Kind::Trigger => "trigger",
      Kind::Action => "action",
      Kind::Overall => "overall",
    }
  }

  /// Column list in positional bind order.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Kind::Trigger => &["id", "timestamp", "type", "intensity", "compulsion", "notes"],
      Kind::Action => &["id", "timestamp", "type", "relief", "duration", "notes"],
      Kind::Overall => &[
        "id",
        "timestamp",
        "clean_streak",
        "gym_session",
        "coding_hours",
        "reading_hours",
        "mood_score",
      ],
    }
  }

  /// Human-facing label, used in API messages.
  pub fn label(self) -> &'static str {
    match self {
      Kind::Trigger => "Trigger",
      Kind::Action => "Action",
      Kind::Overall => "Overall",
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table_name())
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;

  #[test]
  fn queue_and_table_names_are_distinct() {
    let queues: HashSet<_> = Kind::ALL.iter().map(|k| k.queue_name()).collect();
    let tables: HashSet<_> = Kind::ALL.iter().map(|k| k.table_name()).collect();
    assert_eq!(queues.len(), 3);
    assert_eq!(tables.len(), 3);
  }

  #[test]
  fn columns_lead_with_identity() {
    for kind in Kind::ALL {
      assert_eq!(&kind.columns()[..2], &["id", "timestamp"], "{kind}");
    }
  }
}
