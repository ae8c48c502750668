//! Workshop records supplied by the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique workshop identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkshopId(pub Uuid);

impl WorkshopId {
    /// Create a new random workshop ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkshopId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkshopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled workshop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workshop {
    /// Workshop ID
    pub id: WorkshopId,
    /// Title shown in listings
    pub title: String,
    /// Instructor name
    #[serde(default)]
    pub instructor: String,
    /// Target age range (e.g. "5-8 years")
    #[serde(default)]
    pub age_range: String,
    /// Start time
    pub starts_at: DateTime<Utc>,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Total seats
    pub max_participants: u32,
    /// Seats still open
    pub spots_available: u32,
    /// Whether a plan is needed to book
    pub requires_membership: bool,
}

impl Workshop {
    /// Whether at least one seat is open
    pub const fn has_capacity(&self) -> bool {
        self.spots_available > 0
    }
}
