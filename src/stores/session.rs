use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::errors::{AppError, AppResult};
use crate::models::domain::SessionUser;

const SESSION_FILE: &str = "session.json";

/// Session identity as the client currently knows it. `Unresolved` is
/// distinct from `Anonymous`: protected views show a neutral loading state
/// until the first resolution lands, never a sign-in flash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Unresolved,
    Authenticated(SessionUser),
    Anonymous,
}

type Observer = Arc<dyn Fn(&AuthState) + Send + Sync>;

/// Holds the signed-in user and notifies registered observers on every
/// change. The identity record is persisted across runs; the resolved flag is
/// not, so every start begins `Unresolved`.
pub struct SessionStore {
    path: PathBuf,
    state: RwLock<AuthState>,
    resolved: AtomicBool,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_observer_id: AtomicU64,
}

/// Handle for one observer registration; dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    store: Weak<SessionStore>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.remove_observer(self.id);
        }
    }
}

impl SessionStore {
    pub fn open(state_dir: &std::path::Path) -> AppResult<Arc<Self>> {
        fs::create_dir_all(state_dir)?;
        Ok(Arc::new(Self {
            path: state_dir.join(SESSION_FILE),
            state: RwLock::new(AuthState::Unresolved),
            resolved: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
            next_observer_id: AtomicU64::new(1),
        }))
    }

    pub fn state(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        match self.state() {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), AuthState::Authenticated(_))
    }

    /// Whether startup resolution has happened. Views gate on this to avoid
    /// rendering the wrong state while identity is still unknown.
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    /// The identity persisted by a previous run, if any. A hint only: the
    /// store stays `Unresolved` until the provider confirms.
    pub fn persisted_identity(&self) -> Option<SessionUser> {
        let raw = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_authenticated(&self, user: SessionUser) {
        if let Err(err) = self.persist(&user) {
            log::warn!("Failed to persist session identity: {}", err);
        }
        self.transition(AuthState::Authenticated(user));
    }

    pub fn set_anonymous(&self) {
        self.discard_persisted();
        self.transition(AuthState::Anonymous);
    }

    fn transition(&self, next: AuthState) {
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *state = next.clone();
        }
        self.resolved.store(true, Ordering::SeqCst);

        // Snapshot the callbacks and release the lock before invoking, so an
        // observer may unsubscribe itself or register another one.
        let snapshot: Vec<Observer> = {
            let observers = self
                .observers
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            observers
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect()
        };
        for observer in snapshot {
            observer(&next);
        }
    }

    fn persist(&self, user: &SessionUser) -> AppResult<()> {
        let raw = serde_json::to_string(user)?;
        fs::write(&self.path, raw).map_err(|e| AppError::StorageError(e.to_string()))
    }

    fn discard_persisted(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove persisted session identity: {}", err);
            }
        }
    }

    /// Registers an observer for identity changes. The returned handle is the
    /// single way to unsubscribe; dropping it removes the callback.
    pub fn subscribe(
        self: &Arc<Self>,
        observer: impl Fn(&AuthState) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_observer_id.fetch_add(1, Ordering::SeqCst);
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, Arc::new(observer)));

        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    fn remove_observer(&self, id: u64) {
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|(observer_id, _)| *observer_id != id);
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
