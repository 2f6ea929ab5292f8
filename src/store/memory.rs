//! In-process store and sink implementations
//!
//! [`MemoryStore`] backs both store traits with `RwLock`-guarded maps and is
//! what the default binary and the test suite run against. The scan cursor
//! is an offset into key order; pages drift when the set mutates mid-scan,
//! which is inside the scan contract.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use super::{
    EventSink, IndexEntry, IndexMember, ParameterIndex, ScoreRange, SinkError, StoreError,
    TicketStore,
};
use crate::ticket::models::MatchmakingTicket;

#[derive(Debug, Clone)]
struct ScoredMember {
    score: f64,
    username: String,
}

/// Hash-map registry plus sorted parameter indices, all in process memory.
#[derive(Default)]
pub struct MemoryStore {
    /// set name -> player_id -> ticket JSON
    hashes: RwLock<HashMap<String, BTreeMap<String, String>>>,
    /// index name -> player_id -> scored member
    indices: RwLock<HashMap<String, HashMap<String, ScoredMember>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a set (test observability).
    pub async fn set_len(&self, set: &str) -> usize {
        self.hashes
            .read()
            .await
            .get(set)
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Whether a player is currently a member of an index (test observability).
    pub async fn index_contains(&self, index: &str, player_id: &str) -> bool {
        self.indices
            .read()
            .await
            .get(index)
            .map(|m| m.contains_key(player_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn put(
        &self,
        set: &str,
        player_id: &str,
        ticket: &MatchmakingTicket,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(ticket)?;
        self.hashes
            .write()
            .await
            .entry(set.to_string())
            .or_default()
            .insert(player_id.to_string(), payload);
        Ok(())
    }

    async fn get(
        &self,
        set: &str,
        player_id: &str,
    ) -> Result<Option<MatchmakingTicket>, StoreError> {
        let hashes = self.hashes.read().await;
        match hashes.get(set).and_then(|m| m.get(player_id)) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, set: &str, player_id: &str) -> Result<bool, StoreError> {
        let mut hashes = self.hashes.write().await;
        Ok(hashes
            .get_mut(set)
            .map(|m| m.remove(player_id).is_some())
            .unwrap_or(false))
    }

    async fn scan(
        &self,
        set: &str,
        cursor: u64,
        count: u64,
    ) -> Result<(Vec<(String, MatchmakingTicket)>, u64), StoreError> {
        let hashes = self.hashes.read().await;
        let Some(entries) = hashes.get(set) else {
            return Ok((Vec::new(), 0));
        };

        let page_size = count.max(1) as usize;
        let mut page = Vec::with_capacity(page_size);
        for (player_id, payload) in entries.iter().skip(cursor as usize).take(page_size) {
            page.push((player_id.clone(), serde_json::from_str(payload)?));
        }

        let consumed = cursor as usize + page.len();
        let next_cursor = if consumed < entries.len() {
            consumed as u64
        } else {
            0
        };
        Ok((page, next_cursor))
    }
}

#[async_trait]
impl ParameterIndex for MemoryStore {
    async fn add(&self, index: &str, entry: IndexEntry) -> Result<(), StoreError> {
        if !entry.score.is_finite() {
            return Err(StoreError::InvalidScore);
        }
        self.indices.write().await.entry(index.to_string()).or_default().insert(
            entry.member.player_id,
            ScoredMember {
                score: entry.score,
                username: entry.member.player_username,
            },
        );
        Ok(())
    }

    async fn range_by_score(
        &self,
        index: &str,
        range: ScoreRange,
        limit: usize,
    ) -> Result<Vec<IndexMember>, StoreError> {
        let indices = self.indices.read().await;
        let Some(members) = indices.get(index) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(&String, &ScoredMember)> = members
            .iter()
            .filter(|(_, m)| range.contains(m.score))
            .collect();
        hits.sort_by(|(a_id, a), (b_id, b)| {
            a.score.total_cmp(&b.score).then_with(|| a_id.cmp(b_id))
        });
        hits.truncate(limit);

        Ok(hits
            .into_iter()
            .map(|(player_id, m)| IndexMember {
                player_id: player_id.clone(),
                player_username: m.username.clone(),
            })
            .collect())
    }

    async fn remove(&self, index: &str, player_id: &str) -> Result<bool, StoreError> {
        let mut indices = self.indices.write().await;
        Ok(indices
            .get_mut(index)
            .map(|m| m.remove(player_id).is_some())
            .unwrap_or(false))
    }
}

/// A message captured or broadcast by the in-process sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    pub key: String,
    pub payload: Vec<u8>,
}

/// Records every published message; tests drain it with [`MemoryEventSink::take`].
#[derive(Default)]
pub struct MemoryEventSink {
    messages: Mutex<Vec<PublishedEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<PublishedEvent> {
        let mut messages = self.messages.lock().expect("sink mutex poisoned");
        std::mem::take(&mut *messages)
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, key: &str, payload: Vec<u8>) -> Result<(), SinkError> {
        self.messages
            .lock()
            .map_err(|_| SinkError::Unavailable("sink mutex poisoned".to_string()))?
            .push(PublishedEvent {
                key: key.to_string(),
                payload,
            });
        Ok(())
    }
}

/// Fans published messages out to in-process subscribers over a broadcast
/// channel. Used by the default binary so downstream consumers (e.g. a
/// session allocator task) can react to `match-found` envelopes. Publishing
/// with no live subscriber is not an error.
pub struct BroadcastEventSink {
    tx: broadcast::Sender<PublishedEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, key: &str, payload: Vec<u8>) -> Result<(), SinkError> {
        // send() errs only when no receiver exists, which is fine here
        let _ = self.tx.send(PublishedEvent {
            key: key.to_string(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::models::MatchmakingTicket;

    fn ticket(player_id: &str) -> MatchmakingTicket {
        MatchmakingTicket::open(player_id, player_id, Vec::new())
    }

    fn entry(player_id: &str, score: f64) -> IndexEntry {
        IndexEntry {
            member: IndexMember {
                player_id: player_id.to_string(),
                player_username: format!("{player_id}-name"),
            },
            score,
        }
    }

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryStore::new();
        let t = ticket("p1");

        store.put("tickets", "p1", &t).await.unwrap();
        assert_eq!(store.get("tickets", "p1").await.unwrap(), Some(t));

        assert!(store.delete("tickets", "p1").await.unwrap());
        assert!(!store.delete("tickets", "p1").await.unwrap());
        assert_eq!(store.get("tickets", "p1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn scan_pages_through_the_whole_set_and_terminates_with_zero() {
        let store = MemoryStore::new();
        for i in 0..7 {
            let id = format!("p{i}");
            store.put("tickets", &id, &ticket(&id)).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = 0;
        let mut pages = 0;
        loop {
            let (page, next) = store.scan("tickets", cursor, 3).await.unwrap();
            seen.extend(page.into_iter().map(|(id, _)| id));
            pages += 1;
            if next == 0 {
                break;
            }
            cursor = next;
        }

        assert_eq!(pages, 3);
        assert_eq!(seen.len(), 7);
        assert!(seen.contains(&"p0".to_string()) && seen.contains(&"p6".to_string()));
    }

    #[tokio::test]
    async fn scan_of_missing_set_is_empty_and_done() {
        let store = MemoryStore::new();
        let (page, next) = store.scan("nope", 0, 10).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(next, 0);
    }

    #[tokio::test]
    async fn range_by_score_orders_by_score_then_player_id() {
        let store = MemoryStore::new();
        store.add("league", entry("b", 10.0)).await.unwrap();
        store.add("league", entry("a", 10.0)).await.unwrap();
        store.add("league", entry("c", 5.0)).await.unwrap();
        store.add("league", entry("d", 99.0)).await.unwrap();

        let members = store
            .range_by_score("league", ScoreRange::closed(0.0, 50.0), 10)
            .await
            .unwrap();
        let ids: Vec<&str> = members.iter().map(|m| m.player_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn range_by_score_honours_the_limit() {
        let store = MemoryStore::new();
        for i in 0..10 {
            store
                .add("league", entry(&format!("p{i}"), i as f64))
                .await
                .unwrap();
        }

        let members = store
            .range_by_score("league", ScoreRange::closed(0.0, 100.0), 4)
            .await
            .unwrap();
        assert_eq!(members.len(), 4);
    }

    #[tokio::test]
    async fn add_overwrites_a_member_score() {
        let store = MemoryStore::new();
        store.add("league", entry("a", 1.0)).await.unwrap();
        store.add("league", entry("a", 50.0)).await.unwrap();

        let low = store
            .range_by_score("league", ScoreRange::closed(0.0, 10.0), 10)
            .await
            .unwrap();
        assert!(low.is_empty());

        let high = store
            .range_by_score("league", ScoreRange::closed(40.0, 60.0), 10)
            .await
            .unwrap();
        assert_eq!(high.len(), 1);
    }

    #[tokio::test]
    async fn non_finite_scores_are_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.add("league", entry("a", f64::NAN)).await,
            Err(StoreError::InvalidScore)
        ));
    }

    #[tokio::test]
    async fn memory_sink_records_messages_in_order() {
        let sink = MemoryEventSink::new();
        sink.publish("k1", b"one".to_vec()).await.unwrap();
        sink.publish("k2", b"two".to_vec()).await.unwrap();

        let messages = sink.take();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].key, "k1");
        assert_eq!(messages[1].payload, b"two".to_vec());
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn broadcast_sink_reaches_subscribers_and_tolerates_none() {
        let sink = BroadcastEventSink::new(8);
        // No subscriber yet: publish must still succeed.
        sink.publish("k", b"lost".to_vec()).await.unwrap();

        let mut rx = sink.subscribe();
        sink.publish("k", b"seen".to_vec()).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.payload, b"seen".to_vec());
    }
}
