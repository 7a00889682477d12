//! Pending-choice store: one in-flight format choice per user.
//!
//! Maps a Telegram user id to the most recently submitted URL while the bot
//! waits for the Video/Audio button press. A new submission overwrites the
//! previous one, silently abandoning the earlier prompt. Entries have no TTL;
//! an orphaned entry is harmless and gets overwritten by the next `set`.
//!
//! The teloxide dispatcher can run handlers concurrently, so access goes
//! through an async `RwLock` rather than a bare map.

use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct PendingChoices {
    entries: RwLock<HashMap<u64, String>>,
}

impl PendingChoices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional overwrite.
    pub async fn set(&self, user_id: u64, url: String) {
        self.entries.write().await.insert(user_id, url);
    }

    /// The stored URL, if the user has a request awaiting a choice.
    pub async fn get(&self, user_id: u64) -> Option<String> {
        self.entries.read().await.get(&user_id).cloned()
    }

    /// Remove the entry; a no-op when absent.
    pub async fn clear(&self, user_id: u64) {
        self.entries.write().await.remove(&user_id);
    }
}
