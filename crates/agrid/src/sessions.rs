//! Per-session chat history.
//!
//! Each session owns an append-only turn list behind its own mutex. The map
//! lock is taken for writing only when a session is first seen.

use agri_shared::rpc::ChatTurn;
use agri_shared::{Language, Resolution, Resolver};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type Turns = Arc<Mutex<Vec<ChatTurn>>>;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Turns>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn turns(&self, session_id: &str) -> Turns {
        if let Some(turns) = self.sessions.read().await.get(session_id) {
            return turns.clone();
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!("New chat session {}", session_id);
                Arc::new(Mutex::new(Vec::new()))
            })
            .clone()
    }

    /// Record the user turn, resolve, record the reply. The session lock is
    /// held throughout, so turns land in the order messages were received.
    pub async fn exchange(
        &self,
        session_id: &str,
        resolver: &Resolver,
        message: &str,
        lang: Language,
    ) -> Resolution {
        let turns = self.turns(session_id).await;
        let mut turns = turns.lock().await;
        turns.push(ChatTurn::user(message));
        let resolution = resolver.resolve(message, lang);
        turns.push(ChatTurn::assistant(resolution.text.clone(), resolution.intent));
        resolution
    }

    /// Snapshot of a session's turns; None for an unknown session.
    pub async fn transcript(&self, session_id: &str) -> Option<Vec<ChatTurn>> {
        let turns = self.sessions.read().await.get(session_id)?.clone();
        let turns = turns.lock().await;
        Some(turns.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_shared::rpc::ChatRole;
    use agri_shared::{ChatIntent, KnowledgeBase};

    fn resolver() -> Arc<Resolver> {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        Arc::new(Resolver::with_builtin_rules(kb, true))
    }

    #[tokio::test]
    async fn test_exchange_records_both_turns() {
        let store = SessionStore::new();
        let resolver = resolver();
        let r = store
            .exchange("s1", &resolver, "traitement mildiou tomate", Language::Fr)
            .await;

        let turns = store.transcript("s1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].text, "traitement mildiou tomate");
        assert_eq!(turns[1].role, ChatRole::Assistant);
        assert_eq!(turns[1].text, r.text);
        assert_eq!(turns[1].intent, Some(ChatIntent::DiseaseInfo));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let resolver = resolver();
        store.exchange("a", &resolver, "bonjour", Language::Fr).await;
        store.exchange("b", &resolver, "arrosage", Language::Fr).await;
        store.exchange("b", &resolver, "mildiou", Language::Fr).await;

        assert_eq!(store.transcript("a").await.unwrap().len(), 2);
        assert_eq!(store.transcript("b").await.unwrap().len(), 4);
        assert!(store.transcript("c").await.is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_transcript_keeps_receipt_order() {
        let store = SessionStore::new();
        let resolver = resolver();
        for message in ["arrosage", "mildiou", "bio"] {
            store.exchange("plot", &resolver, message, Language::Fr).await;
        }

        let turns = store.transcript("plot").await.unwrap();
        let asked: Vec<&str> = turns.iter().step_by(2).map(|t| t.text.as_str()).collect();
        assert_eq!(asked, ["arrosage", "mildiou", "bio"]);
        assert!(turns.iter().step_by(2).all(|t| t.role == ChatRole::User));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_messages_keep_pairs_together() {
        let store = Arc::new(SessionStore::new());
        let resolver = resolver();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            let resolver = resolver.clone();
            handles.push(tokio::spawn(async move {
                let msg = format!("message {}", i);
                store.exchange("shared", &resolver, &msg, Language::Fr).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let turns = store.transcript("shared").await.unwrap();
        assert_eq!(turns.len(), 40);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, ChatRole::User);
            assert_eq!(pair[1].role, ChatRole::Assistant);
        }
        let mut seen: Vec<&str> = turns.iter().step_by(2).map(|t| t.text.as_str()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }
}
