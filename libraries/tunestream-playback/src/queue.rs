//! Playback queue
//!
//! Holds the ordered ids "in play" and a cursor on the active one:
//!
//! ```text
//! ordered ids:  [ s1, s2, s3, s2 ]
//!                      ^
//!                  active (index 1)
//! ```
//!
//! Ids may repeat, so the cursor is an index rather than an id. The queue
//! never performs I/O and never changes the active entry on its own:
//! `advance` only proposes a candidate, the controller commits it.

use crate::error::{PlaybackError, Result};
use crate::types::{Direction, QueueEndPolicy};
use tunestream_core::TrackId;

/// Candidate position returned by [`Queue::advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStep {
    /// Position in the ordered ids
    pub index: usize,

    /// Track id at that position
    pub id: TrackId,
}

/// Ordered track ids plus the active entry
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Ordered ids (duplicates allowed)
    ids: Vec<TrackId>,

    /// Index of the active id; `None` means idle
    active: Option<usize>,

    /// Behaviour past either end
    end_policy: QueueEndPolicy,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty queue with the given end policy
    pub fn with_end_policy(end_policy: QueueEndPolicy) -> Self {
        Self {
            end_policy,
            ..Self::default()
        }
    }

    /// Current end policy
    pub fn end_policy(&self) -> QueueEndPolicy {
        self.end_policy
    }

    /// Change the end policy
    pub fn set_end_policy(&mut self, policy: QueueEndPolicy) {
        self.end_policy = policy;
    }

    /// Check that `ids` can become a queue starting at `start`
    ///
    /// Returns the index of the first occurrence of `start`.
    pub fn validate(ids: &[TrackId], start: &TrackId) -> Result<usize> {
        if ids.is_empty() {
            return Err(PlaybackError::InvalidQueue("queue is empty".to_string()));
        }

        ids.iter().position(|id| id == start).ok_or_else(|| {
            PlaybackError::InvalidQueue(format!("start track {} is not in the queue", start))
        })
    }

    /// Replace the queue and activate `start`
    ///
    /// Fails with `InvalidQueue` (leaving the queue untouched) if `ids` is
    /// empty or does not contain `start`.
    pub fn set_queue(&mut self, ids: Vec<TrackId>, start: &TrackId) -> Result<()> {
        let index = Self::validate(&ids, start)?;
        self.ids = ids;
        self.active = Some(index);
        Ok(())
    }

    /// Propose the neighbouring entry in `direction`
    ///
    /// Does not mutate. Returns `None` when idle or when the queue is
    /// exhausted under `QueueEndPolicy::Stop`.
    pub fn advance(&self, direction: Direction) -> Option<QueueStep> {
        let current = self.active?;
        let last = self.ids.len().checked_sub(1)?;

        let index = match (direction, self.end_policy) {
            (Direction::Next, _) if current < last => current + 1,
            (Direction::Previous, _) if current > 0 => current - 1,
            (Direction::Next, QueueEndPolicy::Wrap) => 0,
            (Direction::Previous, QueueEndPolicy::Wrap) => last,
            (_, QueueEndPolicy::Stop) => return None,
        };

        Some(QueueStep {
            index,
            id: self.ids[index].clone(),
        })
    }

    /// Activate `id`
    ///
    /// If the active entry already holds `id` it stays put; otherwise the
    /// first occurrence is activated. Fails with `NotInQueue` if absent.
    pub fn set_active(&mut self, id: &TrackId) -> Result<usize> {
        if let Some(index) = self.active {
            if self.ids.get(index) == Some(id) {
                return Ok(index);
            }
        }

        let index = self
            .ids
            .iter()
            .position(|candidate| candidate == id)
            .ok_or_else(|| PlaybackError::NotInQueue(id.clone()))?;
        self.active = Some(index);
        Ok(index)
    }

    /// Activate the entry at `index`
    pub fn set_active_at(&mut self, index: usize) -> Result<()> {
        if index >= self.ids.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.active = Some(index);
        Ok(())
    }

    /// Drop the active entry, keeping the ids
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Clear entire queue
    pub fn clear(&mut self) {
        self.ids.clear();
        self.active = None;
    }

    /// Ordered ids
    pub fn ids(&self) -> &[TrackId] {
        &self.ids
    }

    /// Active id, if any
    pub fn active_id(&self) -> Option<&TrackId> {
        self.active.and_then(|index| self.ids.get(index))
    }

    /// Active index, if any
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` appears anywhere in the queue
    pub fn contains(&self, id: &TrackId) -> bool {
        self.ids.contains(id)
    }

    /// Whether `next` would load a track
    pub fn has_next(&self) -> bool {
        self.advance(Direction::Next).is_some()
    }

    /// Whether `previous` would load a track
    pub fn has_previous(&self) -> bool {
        self.advance(Direction::Previous).is_some()
    }
}
