//! Record shapes: the unit that travels from the API, through a queue, into
//! a table.
//!
//! A record is stamped with its `id` and `timestamp` exactly once, when the
//! API accepts it. Neither is ever rewritten afterwards.

use chrono::{DateTime, SubsecRound as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, kind::Kind};

// ─── Stamped shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
  pub id:         Uuid,
  pub timestamp:  DateTime<Utc>,
  #[serde(rename = "type")]
  pub category:   String,
  pub intensity:  i32,
  pub compulsion: bool,
  pub notes:      String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
  pub id:        Uuid,
  pub timestamp: DateTime<Utc>,
  #[serde(rename = "type")]
  pub category:  String,
  pub relief:    bool,
  /// Minutes.
  pub duration:  i32,
  pub notes:     String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overall {
  pub id:            Uuid,
  pub timestamp:     DateTime<Utc>,
  /// Days.
  pub clean_streak:  i32,
  pub gym_session:   bool,
  pub coding_hours:  i32,
  pub reading_hours: i32,
  pub mood_score:    i32,
}

/// A stamped record of any kind.
///
/// The serialized form is the inner shape only; the kind is implied by the
/// queue the item sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
  Trigger(Trigger),
  Action(Action),
  Overall(Overall),
}

impl Record {
  pub fn kind(&self) -> Kind {
    match self {
      Record::Trigger(_) => Kind::Trigger,
      Record::Action(_) => Kind::Action,
      Record::Overall(_) => Kind::Overall,
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Record::Trigger(t) => t.id,
      Record::Action(a) => a.id,
      Record::Overall(o) => o.id,
    }
  }

  pub fn timestamp(&self) -> DateTime<Utc> {
    match self {
      Record::Trigger(t) => t.timestamp,
      Record::Action(a) => a.timestamp,
      Record::Overall(o) => o.timestamp,
    }
  }

  /// Parse a queued item as the shape of `kind`. Bytes that are not UTF-8
  /// fail the same way as malformed JSON.
  pub fn decode(kind: Kind, raw: &[u8]) -> Result<Self> {
    let parsed = match kind {
      Kind::Trigger => serde_json::from_slice(raw).map(Record::Trigger),
      Kind::Action => serde_json::from_slice(raw).map(Record::Action),
      Kind::Overall => serde_json::from_slice(raw).map(Record::Overall),
    };
    parsed.map_err(|source| Error::Decode { kind, source })
  }

  /// Serialize the inner shape for pushing onto a queue.
  pub fn encode(&self) -> Result<Vec<u8>> {
    let raw = match self {
      Record::Trigger(t) => serde_json::to_vec(t)?,
      Record::Action(a) => serde_json::to_vec(a)?,
      Record::Overall(o) => serde_json::to_vec(o)?,
    };
    Ok(raw)
  }
}

// ─── Unstamped input ─────────────────────────────────────────────────────────

/// Trigger payload as submitted, before identity is assigned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTrigger {
  #[serde(rename = "type")]
  pub category:   String,
  pub intensity:  i32,
  pub compulsion: bool,
  pub notes:      String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewAction {
  #[serde(rename = "type")]
  pub category: String,
  pub relief:   bool,
  pub duration: i32,
  pub notes:    String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewOverall {
  pub clean_streak:  i32,
  pub gym_session:   bool,
  pub coding_hours:  i32,
  pub reading_hours: i32,
  pub mood_score:    i32,
}

/// A submitted payload of any kind.
#[derive(Debug, Clone)]
pub enum NewRecord {
  Trigger(NewTrigger),
  Action(NewAction),
  Overall(NewOverall),
}

impl NewRecord {
  pub fn kind(&self) -> Kind {
    match self {
      NewRecord::Trigger(_) => Kind::Trigger,
      NewRecord::Action(_) => Kind::Action,
      NewRecord::Overall(_) => Kind::Overall,
    }
  }

  /// Minimal shape check: triggers and actions need a non-empty category.
  pub fn validate(&self) -> Result<()> {
    let category = match self {
      NewRecord::Trigger(t) => &t.category,
      NewRecord::Action(a) => &a.category,
      NewRecord::Overall(_) => return Ok(()),
    };
    if category.is_empty() {
      return Err(Error::MissingCategory(self.kind()));
    }
    Ok(())
  }

  /// Assign a fresh identifier and the capture time.
  pub fn stamp(self) -> Record {
    let id = Uuid::new_v4();
    let timestamp = capture_time();
    match self {
      NewRecord::Trigger(t) => Record::Trigger(Trigger {
        id,
        timestamp,
        category: t.category,
        intensity: t.intensity,
        compulsion: t.compulsion,
        notes: t.notes,
      }),
      NewRecord::Action(a) => Record::Action(Action {
        id,
        timestamp,
        category: a.category,
        relief: a.relief,
        duration: a.duration,
        notes: a.notes,
      }),
      NewRecord::Overall(o) => Record::Overall(Overall {
        id,
        timestamp,
        clean_streak: o.clean_streak,
        gym_session: o.gym_session,
        coding_hours: o.coding_hours,
        reading_hours: o.reading_hours,
        mood_score: o.mood_score,
      }),
    }
  }
}

/// Current UTC time at second precision.
pub fn capture_time() -> DateTime<Utc> { Utc::now().trunc_subsecs(0) }
