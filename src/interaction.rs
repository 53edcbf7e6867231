//! Pending interactions: replies the bot is waiting for, keyed by the id of the
//! message that asked the question.
//!
//! Each entry carries the conversation state, the only author allowed to answer
//! and an expiry. A reply from anybody else leaves the entry untouched; an
//! expired entry is discarded on access.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInteraction<S> {
    pub state: S,
    pub author: String,
    #[serde(default)]
    pub context: Value,
    pub expires_at: DateTime<Utc>,
}

impl<S> PendingInteraction<S> {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct InteractionRegistry<S> {
    pending: HashMap<String, PendingInteraction<S>>,
    ttl: Duration,
}

impl<S> InteractionRegistry<S> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
        }
    }

    /// Out-of-range values saturate to the longest representable window.
    pub fn with_ttl_secs(ttl_secs: i64) -> Self {
        Self::new(Duration::try_seconds(ttl_secs).unwrap_or(Duration::MAX))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Wait for `author` to reply to `message_id`. Replaces any earlier entry for that id.
    pub fn register(
        &mut self,
        message_id: &str,
        author: &str,
        state: S,
        context: Value,
        now: DateTime<Utc>,
    ) {
        trace!("interaction: waiting on {} from {}", message_id, author);
        self.pending.insert(
            message_id.to_string(),
            PendingInteraction {
                state,
                author: author.to_string(),
                context,
                expires_at: now
                    .checked_add_signed(self.ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
        );
    }

    /// Claim the entry for `message_id` if `author` may answer it and it has not expired.
    pub fn take(
        &mut self,
        message_id: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Option<PendingInteraction<S>> {
        let entry = self.pending.get(message_id)?;
        if entry.is_expired(now) {
            debug!("interaction: {} expired", message_id);
            self.pending.remove(message_id);
            return None;
        }
        if entry.author != author {
            trace!(
                "interaction: ignoring reply to {} from {} (waiting on {})",
                message_id,
                author,
                entry.author
            );
            return None;
        }
        self.pending.remove(message_id)
    }

    pub fn peek(&self, message_id: &str) -> Option<&PendingInteraction<S>> {
        self.pending.get(message_id)
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, entry| !entry.is_expired(now));
        before - self.pending.len()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
