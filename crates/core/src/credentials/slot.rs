//! Single-flight credential cache slot
//!
//! A slot is `Empty`, `Cached(value)` or `Refreshing(shared future)`. All
//! transitions happen under one `tokio::sync::Mutex`. Starting a refresh
//! stores a [`Shared`] future in the slot; callers arriving while it runs
//! clone that future and await the same result instead of issuing their own
//! request. The future writes its result back into the slot when it
//! completes, so a refresh whose first caller was dropped is still finished
//! by whoever awaits it next. A refresh that panics resolves to
//! `SpApiError::Internal` and leaves the slot `Empty`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use spapi_domain::{Result, SpApiError};
use tracing::error;
use tokio::sync::Mutex;

type SharedRefresh<T> = Shared<BoxFuture<'static, Result<T>>>;

enum SlotState<T> {
    Empty,
    Cached(T),
    Refreshing(SharedRefresh<T>),
}

struct SlotInner<T> {
    state: SlotState<T>,
    // Bumped on every store/start/invalidate; a refresh only writes back if
    // the slot was not changed underneath it.
    generation: u64,
}

/// One cached credential with single-flight refresh
pub struct CredentialSlot<T> {
    inner: Arc<Mutex<SlotInner<T>>>,
}

impl<T> Default for CredentialSlot<T> {
    fn default() -> Self {
        Self { inner: Arc::new(Mutex::new(SlotInner { state: SlotState::Empty, generation: 0 })) }
    }
}

impl<T> CredentialSlot<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: Option<T>) -> Self {
        let state = initial.map_or(SlotState::Empty, SlotState::Cached);
        Self { inner: Arc::new(Mutex::new(SlotInner { state, generation: 0 })) }
    }

    /// Cached value regardless of freshness
    pub async fn cached(&self) -> Option<T> {
        match &self.inner.lock().await.state {
            SlotState::Cached(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Return the cached value if `is_fresh` accepts it, otherwise join the
    /// in-flight refresh or start one with `refresh`
    ///
    /// # Errors
    /// Returns the refresh error; the slot is left `Empty`
    pub async fn get_or_refresh<F>(&self, is_fresh: impl Fn(&T) -> bool, refresh: F) -> Result<T>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T>>,
    {
        let pending = {
            let mut guard = self.inner.lock().await;
            match &guard.state {
                SlotState::Cached(value) if is_fresh(value) => return Ok(value.clone()),
                SlotState::Refreshing(pending) => pending.clone(),
                _ => self.start(&mut guard, refresh()),
            }
        };
        pending.await
    }

    /// Refresh regardless of the cached value, joining a refresh already in
    /// flight
    ///
    /// # Errors
    /// Returns the refresh error; the slot is left `Empty`
    pub async fn refresh<F>(&self, refresh: F) -> Result<T>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T>>,
    {
        let pending = {
            let mut guard = self.inner.lock().await;
            match &guard.state {
                SlotState::Refreshing(pending) => pending.clone(),
                _ => self.start(&mut guard, refresh()),
            }
        };
        pending.await
    }

    /// Replace the slot content with `value`
    pub async fn store(&self, value: T) {
        let mut guard = self.inner.lock().await;
        guard.generation += 1;
        guard.state = SlotState::Cached(value);
    }

    /// Drop the cached value if it is still `rejected`
    ///
    /// Returns whether anything was dropped. A value cached by a newer
    /// refresh, or a refresh in flight, is left alone.
    pub async fn invalidate(&self, rejected: &T) -> bool {
        let mut guard = self.inner.lock().await;
        if matches!(&guard.state, SlotState::Cached(value) if value == rejected) {
            guard.generation += 1;
            guard.state = SlotState::Empty;
            true
        } else {
            false
        }
    }

    fn start(
        &self,
        guard: &mut SlotInner<T>,
        refresh: BoxFuture<'static, Result<T>>,
    ) -> SharedRefresh<T> {
        guard.generation += 1;
        let generation = guard.generation;
        let slot: Weak<Mutex<SlotInner<T>>> = Arc::downgrade(&self.inner);

        let pending = async move {
            let result = AssertUnwindSafe(refresh).catch_unwind().await.unwrap_or_else(|panic| {
                let reason = panic_message(panic.as_ref());
                error!(%reason, "credential refresh panicked");
                Err(SpApiError::Internal(format!("credential refresh panicked: {reason}")))
            });
            if let Some(slot) = slot.upgrade() {
                let mut inner = slot.lock().await;
                if inner.generation == generation {
                    inner.state = match &result {
                        Ok(value) => SlotState::Cached(value.clone()),
                        Err(_) => SlotState::Empty,
                    };
                }
            }
            result
        }
        .boxed()
        .shared();

        guard.state = SlotState::Refreshing(pending.clone());
        pending
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use spapi_domain::SpApiError;

    use super::*;

    fn counted(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> BoxFuture<'static, Result<String>> {
        let calls = Arc::clone(calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(value.to_string())
        }
        .boxed()
    }

    #[tokio::test]
    async fn fresh_value_is_reused() {
        let slot = CredentialSlot::new(Some("cached".to_string()));
        let calls = Arc::new(AtomicUsize::new(0));

        let value = slot.get_or_refresh(|_| true, || counted(&calls, "new")).await.unwrap();

        assert_eq!(value, "cached");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_value_is_refreshed() {
        let slot = CredentialSlot::new(Some("stale".to_string()));
        let calls = Arc::new(AtomicUsize::new(0));

        let value = slot.get_or_refresh(|_| false, || counted(&calls, "new")).await.unwrap();

        assert_eq!(value, "new");
        assert_eq!(slot.cached().await.as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let slot = Arc::new(CredentialSlot::<String>::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                slot.get_or_refresh(|_| true, || counted(&calls, "shared")).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_empties_slot() {
        let slot = CredentialSlot::new(Some("old".to_string()));

        let err = slot
            .refresh(|| {
                async { Err(SpApiError::upstream("invalid_grant", "bad token", Some(400))) }
                    .boxed()
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "invalid_grant");
        assert!(slot.cached().await.is_none());
        assert!(matches!(slot.inner.lock().await.state, SlotState::Empty));
    }

    #[tokio::test]
    async fn panicking_refresh_leaves_slot_usable() {
        let slot = CredentialSlot::<String>::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let err = slot
            .refresh(|| {
                async {
                    let expires_at = chrono::DateTime::<chrono::Utc>::MAX_UTC
                        + chrono::Duration::seconds(1);
                    Ok(expires_at.to_string())
                }
                .boxed()
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.message().contains("overflowed"));
        assert!(matches!(slot.inner.lock().await.state, SlotState::Empty));

        let value = slot.get_or_refresh(|_| true, || counted(&calls, "recovered")).await.unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_strand_refresh() {
        let slot = Arc::new(CredentialSlot::<String>::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            tokio::spawn(
                async move { slot.get_or_refresh(|_| true, || counted(&calls, "v")).await },
            )
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        first.abort();

        let value = slot.get_or_refresh(|_| true, || counted(&calls, "other")).await.unwrap();
        assert_eq!(value, "v");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_only_drops_rejected_value() {
        let slot = CredentialSlot::new(Some("current".to_string()));

        assert!(!slot.invalidate(&"older".to_string()).await);
        assert_eq!(slot.cached().await.as_deref(), Some("current"));

        assert!(slot.invalidate(&"current".to_string()).await);
        assert!(slot.cached().await.is_none());
    }

    #[tokio::test]
    async fn store_wins_over_in_flight_refresh() {
        let slot = Arc::new(CredentialSlot::<String>::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let refreshing = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            tokio::spawn(async move { slot.refresh(|| counted(&calls, "refreshed")).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        slot.store("exchanged".to_string()).await;

        assert_eq!(refreshing.await.unwrap().unwrap(), "refreshed");
        assert_eq!(slot.cached().await.as_deref(), Some("exchanged"));
    }
}
