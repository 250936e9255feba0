use serde::Serialize;
use shared_types::ChatMessageResponse;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of each per-case broadcast channel. Slow subscribers that
/// fall further behind than this lose events (best-effort delivery).
const CHANNEL_CAPACITY: usize = 64;

/// A live event scoped to one case's room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CaseEvent {
    NewChatMessage(ChatMessageResponse),
    Typing { user_id: Uuid, user_name: String },
}

/// Per-case pub/sub hub for live chat delivery.
///
/// Handlers receive the hub through `AppState` rather than looking a
/// transport up from ambient application state; topics are keyed by
/// case id and created on first subscribe or publish.
#[derive(Clone, Default)]
pub struct CaseEventHub {
    topics: Arc<Mutex<HashMap<Uuid, broadcast::Sender<CaseEvent>>>>,
}

impl CaseEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a case's room, creating the topic if needed.
    pub fn subscribe(&self, case_id: Uuid) -> broadcast::Receiver<CaseEvent> {
        let mut topics = self.topics.lock().unwrap();
        topics
            .entry(case_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to a case's room. Returns the number of
    /// subscribers reached; rooms with no listeners are pruned.
    pub fn publish(&self, case_id: Uuid, event: CaseEvent) -> usize {
        let mut topics = self.topics.lock().unwrap();
        match topics.get(&case_id) {
            Some(tx) => match tx.send(event) {
                Ok(n) => n,
                Err(_) => {
                    topics.remove(&case_id);
                    0
                }
            },
            None => 0,
        }
    }

    /// Number of live topics (for diagnostics).
    pub fn topic_count(&self) -> usize {
        self.topics.lock().unwrap().len()
    }
}
