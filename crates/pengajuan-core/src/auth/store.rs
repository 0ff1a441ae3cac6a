use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::warn;

use super::{Credential, SessionEvent, SessionFile};

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Default)]
struct StoreState {
    credential: Option<Credential>,
    generation: u64,
}

#[derive(Debug)]
struct StoreInner {
    state: RwLock<StoreState>,
    session_file: Option<SessionFile>,
    /// Serializes refresh exchanges for this session
    refresh_lock: Mutex<()>,
    /// Sign-in signals for every client sharing this session
    events: broadcast::Sender<SessionEvent>,
}

/// Single source of truth for the signed-in credential.
///
/// Clone is cheap and every clone shares the same state, so one store is
/// handed to every component that issues requests for the session. Each
/// `set`/`clear` bumps a generation counter that lets concurrent requests
/// tell whether the credential changed under them.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<StoreInner>,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Create an in-memory store with no credential.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Create a store mirrored to `session_file`, seeded from what the file
    /// currently holds.
    pub fn with_session_file(session_file: SessionFile) -> Self {
        let credential = match session_file.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, path = %session_file.path().display(), "Ignoring unreadable session file");
                None
            }
        };
        Self::build(credential, Some(session_file))
    }

    fn build(credential: Option<Credential>, session_file: Option<SessionFile>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState {
                    credential,
                    generation: 0,
                }),
                session_file,
                refresh_lock: Mutex::new(()),
                events,
            }),
        }
    }

    pub fn get(&self) -> Option<Credential> {
        self.read(|state| state.credential.clone())
    }

    /// Current credential together with the generation it belongs to.
    pub fn snapshot(&self) -> (Option<Credential>, u64) {
        self.read(|state| (state.credential.clone(), state.generation))
    }

    pub fn generation(&self) -> u64 {
        self.read(|state| state.generation)
    }

    pub fn is_authenticated(&self) -> bool {
        self.read(|state| state.credential.is_some())
    }

    /// Replace the stored credential. Only call this with the result of a
    /// successful login or refresh exchange.
    pub fn set(&self, credential: Credential) {
        // The session file is written under the lock so it never lags memory
        let mut state = self.write();
        if let Some(ref file) = self.inner.session_file {
            if let Err(e) = file.save(&credential) {
                warn!(error = %e, "Failed to save session");
            }
        }
        state.credential = Some(credential);
        state.generation += 1;
    }

    /// Remove the stored credential, returning it if there was one.
    pub fn clear(&self) -> Option<Credential> {
        let mut state = self.write();
        if let Some(ref file) = self.inner.session_file {
            if let Err(e) = file.clear() {
                warn!(error = %e, "Failed to remove session file");
            }
        }
        let removed = state.credential.take();
        if removed.is_some() {
            state.generation += 1;
        }
        removed
    }

    /// Session events for every client built on this store
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.inner.refresh_lock.lock().await
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(access: &str, refresh: &str) -> Credential {
        Credential::new("admin", "Aditya", "admin", access, refresh)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let store = CredentialStore::new();
        assert_eq!(store.get(), None);

        let cred = credential("A1", "R1");
        store.set(cred.clone());
        assert_eq!(store.get(), Some(cred));
    }

    #[test]
    fn test_generation_bumps_on_change() {
        let store = CredentialStore::new();
        assert_eq!(store.generation(), 0);

        store.set(credential("A1", "R1"));
        assert_eq!(store.generation(), 1);

        store.set(credential("A2", "R2"));
        let (current, generation) = store.snapshot();
        assert_eq!(generation, 2);
        assert_eq!(current.map(|c| c.access_token), Some("A2".to_string()));

        assert!(store.clear().is_some());
        assert_eq!(store.generation(), 3);

        // Clearing an empty store changes nothing
        assert!(store.clear().is_none());
        assert_eq!(store.generation(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let store = CredentialStore::new();
        let other = store.clone();

        store.set(credential("A1", "R1"));
        assert!(other.is_authenticated());

        other.clear();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_session_file_mirroring() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::with_session_file(SessionFile::in_dir(dir.path()));
        assert!(!store.is_authenticated());

        store.set(credential("A1", "R1"));

        let restored = CredentialStore::with_session_file(SessionFile::in_dir(dir.path()));
        assert_eq!(restored.get(), Some(credential("A1", "R1")));

        restored.clear();
        let after_clear = CredentialStore::with_session_file(SessionFile::in_dir(dir.path()));
        assert!(!after_clear.is_authenticated());
    }

    #[test]
    fn test_session_file_follows_memory_under_contention() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::with_session_file(SessionFile::in_dir(dir.path()));

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for round in 0..25 {
                        if (worker + round) % 2 == 0 {
                            store.set(credential(&format!("A{worker}-{round}"), "R1"));
                        } else {
                            store.clear();
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        let on_disk = SessionFile::in_dir(dir.path()).load().expect("load");
        assert_eq!(on_disk, store.get());
    }

    #[tokio::test]
    async fn test_clones_share_events() {
        let store = CredentialStore::new();
        let mut events = store.clone().subscribe();

        store.notify(SessionEvent::SignInRequired {
            reason: crate::auth::SignOutReason::SignedOut,
        });
        assert!(events.recv().await.is_ok());
    }
}
