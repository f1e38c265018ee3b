use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::{EventBus, SessionState, UiEvent};
use crate::types::{PickMode, Selections, StrategyName, WidgetEnablement};

const SESSION_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// What the page needs to re-render one session's form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub panel_open: bool,
    pub pick_mode: Option<i64>,
    pub enablement: WidgetEnablement,
    pub selections: Selections,
    pub strategy: Option<StrategyName>,
}

impl SessionSnapshot {
    fn new(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            panel_open: state.panel.is_open(),
            pick_mode: state.pick_mode.map(PickMode::radio_value),
            enablement: state.enablement,
            selections: state.selections.clone(),
            strategy: state.strategy,
        }
    }
}

struct Session {
    state: SessionState,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    tx: broadcast::Sender<SessionSnapshot>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            state: SessionState::default(),
            created_at: now,
            last_seen: now,
            tx,
        }
    }
}

/// Per-client UI state, keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    bus: Arc<EventBus>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(bus: EventBus, ttl: std::time::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            bus: Arc::new(bus),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::max_value()),
        }
    }

    pub async fn create(&self) -> SessionSnapshot {
        let id = Uuid::new_v4();
        let session = Session::new(Utc::now());
        let snapshot = SessionSnapshot::new(id, &session.state);

        self.sessions.write().await.insert(id, session);
        info!("Session {} created", id);
        snapshot
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.last_seen = Utc::now();
        Ok(SessionSnapshot::new(id, &session.state))
    }

    /// Copy of the session's form state.
    pub async fn state(&self, id: Uuid) -> Result<SessionState, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.last_seen = Utc::now();
        Ok(session.state.clone())
    }

    /// Apply one UI event to one session and publish the new snapshot to
    /// that session's subscribers.
    pub async fn dispatch(&self, id: Uuid, event: &UiEvent) -> Result<SessionSnapshot, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;

        self.bus.dispatch(&mut session.state, event)?;
        session.last_seen = Utc::now();

        let snapshot = SessionSnapshot::new(id, &session.state);
        let _ = session.tx.send(snapshot.clone());
        Ok(snapshot)
    }

    pub async fn subscribe(&self, id: Uuid) -> Result<broadcast::Receiver<SessionSnapshot>, SessionError> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
        Ok(session.tx.subscribe())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        if let Some(session) = &removed {
            info!(
                "Session {} closed after {}s",
                id,
                (Utc::now() - session.created_at).num_seconds()
            );
        }
        removed.is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for longer than the TTL as of `now`.
    ///
    /// A session with a connected subscriber is never idle.
    pub async fn expire_idle(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|id, session| {
            let keep = session.tx.receiver_count() > 0 || now - session.last_seen <= ttl;
            if !keep {
                debug!("Session {} expired", id);
            }
            keep
        });
        let expired = before - sessions.len();
        if expired > 0 {
            info!("Expired {} idle sessions ({} active)", expired, sessions.len());
        }
        expired
    }

    pub fn spawn_sweeper(&self, every: std::time::Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                store.expire_idle(Utc::now()).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SessionStore {
        SessionStore::new(EventBus::default(), std::time::Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_new_session_defaults() {
        let store = store();
        let snapshot = store.create().await;

        assert!(!snapshot.panel_open);
        assert_eq!(snapshot.pick_mode, None);
        assert_eq!(snapshot.enablement, WidgetEnablement::ALL_ENABLED);
        assert_eq!(snapshot.strategy, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = store();
        let a = store.create().await.session_id;
        let b = store.create().await.session_id;

        store
            .dispatch(a, &UiEvent::PickModeChanged { value: Some(json!(1)) })
            .await
            .unwrap();
        store.dispatch(a, &UiEvent::PanelToggled).await.unwrap();

        let a_snap = store.snapshot(a).await.unwrap();
        let b_snap = store.snapshot(b).await.unwrap();
        assert_eq!(a_snap.pick_mode, Some(1));
        assert!(a_snap.panel_open);
        assert_eq!(b_snap.pick_mode, None);
        assert!(!b_snap.panel_open);
        assert_eq!(b_snap.enablement, WidgetEnablement::ALL_ENABLED);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = store();
        let id = Uuid::new_v4();
        assert_eq!(store.snapshot(id).await, Err(SessionError::NotFound(id)));
        assert_eq!(
            store.dispatch(id, &UiEvent::PanelToggled).await,
            Err(SessionError::NotFound(id))
        );
        assert!(!store.remove(id).await);
    }

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let store = store();
        let id = store.create().await.session_id;
        let other = store.create().await.session_id;
        let mut rx = store.subscribe(id).await.unwrap();
        let mut other_rx = store.subscribe(other).await.unwrap();

        store
            .dispatch(id, &UiEvent::PickModeChanged { value: Some(json!(3)) })
            .await
            .unwrap();

        let update = rx.recv().await.unwrap();
        assert_eq!(update.enablement.as_tuple(), (true, true, false));
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_expire_idle() {
        let store = SessionStore::new(EventBus::default(), std::time::Duration::from_secs(10));
        let id = store.create().await.session_id;

        assert_eq!(store.expire_idle(Utc::now()).await, 0);
        assert_eq!(store.expire_idle(Utc::now() + Duration::seconds(11)).await, 1);
        assert_eq!(store.snapshot(id).await, Err(SessionError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_subscribed_session_survives_expiry() {
        let store = SessionStore::new(EventBus::default(), std::time::Duration::from_secs(10));
        let id = store.create().await.session_id;
        let mut rx = store.subscribe(id).await.unwrap();

        assert_eq!(store.expire_idle(Utc::now() + Duration::seconds(11)).await, 0);
        store.dispatch(id, &UiEvent::PanelToggled).await.unwrap();
        assert!(rx.recv().await.unwrap().panel_open);

        // Once the subscriber goes away the session is idle again.
        drop(rx);
        assert_eq!(store.expire_idle(Utc::now() + Duration::seconds(11)).await, 1);
        assert_eq!(store.snapshot(id).await, Err(SessionError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_remove_session() {
        let store = store();
        let id = store.create().await.session_id;
        assert!(store.remove(id).await);
        assert_eq!(store.len().await, 0);
    }
}
