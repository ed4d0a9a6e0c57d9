//! Compute-once cells for default-settings descriptors.
//!
//! A [`Deferred`] starts unresolved and becomes resolved exactly once, on the
//! first read. The value is built by a caller-supplied function that reads its
//! collaborator inputs at that moment, so no descriptor is assembled while the
//! program is still wiring its statics together.
//!
//! [`Handle`] pairs a cell with its build function and is what the rest of
//! the crate exposes: every read goes through it and triggers the build if
//! needed. Handles can live in a `static` (process-wide, never torn down) or
//! be owned by a resolver that was handed its collaborators explicitly.
//!
//! Concurrent first reads from different threads wait on the one build and
//! then observe the same instance. A build that reads its own handle again on
//! the same thread is a configuration bug; it is reported as
//! [`AppError::Reentrant`] instead of deadlocking.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::descriptor;
use crate::error::AppError;

// ── Deferred ──────────────────────────────────────────────────────────────────

/// One-shot memoized slot for a single descriptor.
pub struct Deferred<T> {
    name: &'static str,
    cell: OnceLock<T>,
    /// Thread currently running the build, if any.
    building: Mutex<Option<ThreadId>>,
    builds: AtomicUsize,
}

impl<T> Deferred<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceLock::new(),
            building: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The resolved value, without triggering a build.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Number of completed builds. Never exceeds 1.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    /// Return the cached value, running `build` first if nothing is cached.
    ///
    /// Fails with [`AppError::Reentrant`] when called from inside this cell's
    /// own build on the same thread.
    pub fn get_or_build<F>(&self, build: F) -> Result<&T, AppError>
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.cell.get() {
            return Ok(value);
        }

        let me = thread::current().id();
        if self.builder() == Some(me) {
            warn!(descriptor = self.name, "reentrant resolution detected");
            return Err(AppError::Reentrant(self.name));
        }

        Ok(self.cell.get_or_init(|| {
            let _guard = BuildGuard::enter(&self.building, me);
            debug!(descriptor = self.name, "building descriptor");
            let value = build();
            let n = self.builds.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(descriptor = self.name, builds = n, "descriptor resolved");
            value
        }))
    }

    fn builder(&self) -> Option<ThreadId> {
        *self.building.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("name", &self.name)
            .field("value", &self.cell.get())
            .finish()
    }
}

/// Marks the current thread as the builder; clears the mark on drop, so a
/// panicking build leaves the cell retryable.
struct BuildGuard<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> BuildGuard<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>, id: ThreadId) -> Self {
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
        Self { slot }
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Accessor handle: a [`Deferred`] cell plus the function that builds it.
///
/// Reading through the handle (`resolve`, `get`, `keys`, or plain field
/// access via `Deref`) is what triggers the build.
pub struct Handle<T, F = fn() -> T> {
    cell: Deferred<T>,
    view: OnceLock<Value>,
    init: F,
}

impl<T, F> Handle<T, F> {
    pub const fn new(name: &'static str, init: F) -> Self {
        Self {
            cell: Deferred::new(name),
            view: OnceLock::new(),
            init,
        }
    }

    pub fn name(&self) -> &'static str {
        self.cell.name()
    }

    /// Whether the first read has already happened. Does not trigger a build.
    pub fn is_resolved(&self) -> bool {
        self.cell.is_resolved()
    }

    pub fn build_count(&self) -> usize {
        self.cell.build_count()
    }
}

impl<T, F: Fn() -> T> Handle<T, F> {
    /// Resolve the descriptor, reporting reentrancy as an error.
    pub fn try_resolve(&self) -> Result<&T, AppError> {
        self.cell.get_or_build(|| (self.init)())
    }

    /// Resolve the descriptor.
    ///
    /// # Panics
    /// Panics if the build re-enters this handle on the same thread.
    pub fn resolve(&self) -> &T {
        match self.try_resolve() {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T: Serialize, F: Fn() -> T> Handle<T, F> {
    /// Nested key/value view of the resolved descriptor, cached alongside it.
    ///
    /// The cell is resolved before the view is touched, so a build that reads
    /// its own handle through `get` or `keys` hits the reentrancy check.
    pub fn try_descriptor(&self) -> Result<&Value, AppError> {
        let value = self.try_resolve()?;
        if let Some(view) = self.view.get() {
            return Ok(view);
        }
        let view = descriptor::to_value(value)?;
        Ok(self.view.get_or_init(|| view))
    }

    /// # Panics
    /// Panics on reentrancy or when the descriptor cannot be serialized.
    pub fn descriptor(&self) -> &Value {
        match self.try_descriptor() {
            Ok(view) => view,
            Err(e) => panic!("{e}"),
        }
    }

    /// `resolve().key`, with dotted paths for nested fields
    /// (`"chatConfig.historyCount"`). Unknown keys yield `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        descriptor::lookup(self.descriptor(), key).cloned()
    }

    /// Top-level keys of the resolved descriptor.
    pub fn keys(&self) -> Vec<String> {
        descriptor::keys(self.descriptor())
    }
}

impl<T, F: Fn() -> T> Deref for Handle<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        self.resolve()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Handle<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.cell).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, Barrier, mpsc};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Pair {
        model: String,
        provider: String,
    }

    #[test]
    fn unresolved_until_first_read() {
        let handle = Handle::new("pair", || Pair {
            model: "m".into(),
            provider: "p".into(),
        });
        assert!(!handle.is_resolved());
        assert_eq!(handle.build_count(), 0);

        assert_eq!(handle.model, "m");
        assert!(handle.is_resolved());
        assert_eq!(handle.build_count(), 1);
    }

    #[test]
    fn repeated_reads_share_one_instance() {
        let counter = AtomicUsize::new(0);
        let handle = Handle::new("counted", || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        });

        let first: *const Vec<i32> = handle.resolve();
        for _ in 0..10 {
            assert!(std::ptr::eq(first, handle.resolve()));
            assert_eq!(handle.len(), 3);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(handle.build_count(), 1);
    }

    #[test]
    fn get_reads_nested_keys() {
        let handle = Handle::new("pair", || Pair {
            model: "gpt-5-mini".into(),
            provider: "openai".into(),
        });
        assert_eq!(handle.get("model"), Some(Value::from("gpt-5-mini")));
        assert_eq!(handle.get("provider"), Some(Value::from("openai")));
        assert_eq!(handle.get("missing"), None);
        assert_eq!(handle.keys(), vec!["model".to_string(), "provider".to_string()]);
    }

    #[test]
    fn get_triggers_resolution() {
        let handle = Handle::new("pair", || Pair {
            model: "a".into(),
            provider: "b".into(),
        });
        assert!(!handle.is_resolved());
        let _ = handle.get("model");
        assert!(handle.is_resolved());
    }

    #[test]
    fn concurrent_first_reads_build_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let handle = Handle::new("shared", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            String::from("resolved")
        });
        let barrier = Barrier::new(2);

        let (a, b) = std::thread::scope(|s| {
            let ta = s.spawn(|| {
                barrier.wait();
                handle.resolve() as *const String as usize
            });
            let tb = s.spawn(|| {
                barrier.wait();
                handle.resolve() as *const String as usize
            });
            (ta.join().unwrap(), tb.join().unwrap())
        });

        assert_eq!(a, b);
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(handle.build_count(), 1);
    }

    static SELF_REFERENTIAL: Handle<u32> = Handle::new("SELF_REFERENTIAL", build_self_referential);
    static SAW_REENTRY: AtomicBool = AtomicBool::new(false);

    fn build_self_referential() -> u32 {
        match SELF_REFERENTIAL.try_resolve() {
            Ok(v) => *v + 1,
            Err(AppError::Reentrant(name)) => {
                assert_eq!(name, "SELF_REFERENTIAL");
                SAW_REENTRY.store(true, Ordering::SeqCst);
                7
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn reentrant_build_fails_fast() {
        let value = SELF_REFERENTIAL.try_resolve().unwrap();
        assert_eq!(*value, 7);
        assert!(SAW_REENTRY.load(Ordering::SeqCst));
        assert_eq!(SELF_REFERENTIAL.build_count(), 1);
    }

    static VIA_GET: Handle<Pair> = Handle::new("VIA_GET", build_via_get);

    fn build_via_get() -> Pair {
        let _ = VIA_GET.get("model");
        Pair {
            model: "unreachable".into(),
            provider: "unreachable".into(),
        }
    }

    #[test]
    fn reentrant_get_panics_instead_of_hanging() {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let outcome = std::panic::catch_unwind(|| VIA_GET.get("model"));
            let message = outcome
                .err()
                .and_then(|payload| payload.downcast_ref::<String>().cloned());
            let _ = tx.send(message);
        });

        let message = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("first read through get() must not block");
        let message = message.expect("reentrant get() must panic");
        assert!(message.contains("reentrant resolution of 'VIA_GET'"), "{message}");
        assert!(!VIA_GET.is_resolved());
    }

    static VIA_KEYS: Handle<Pair> = Handle::new("VIA_KEYS", build_via_keys);
    static KEYS_SAW_REENTRY: AtomicBool = AtomicBool::new(false);

    fn build_via_keys() -> Pair {
        if let Err(AppError::Reentrant("VIA_KEYS")) = VIA_KEYS.try_descriptor() {
            KEYS_SAW_REENTRY.store(true, Ordering::SeqCst);
        }
        Pair {
            model: "m".into(),
            provider: "p".into(),
        }
    }

    #[test]
    fn reentrant_try_descriptor_reports_error() {
        assert_eq!(VIA_KEYS.keys(), vec!["model".to_string(), "provider".to_string()]);
        assert!(KEYS_SAW_REENTRY.load(Ordering::SeqCst));
        assert_eq!(VIA_KEYS.build_count(), 1);
    }

    static CYCLE_A: Handle<u32> = Handle::new("CYCLE_A", build_cycle_a);
    static CYCLE_B: Handle<u32> = Handle::new("CYCLE_B", build_cycle_b);

    fn build_cycle_a() -> u32 {
        *CYCLE_B + 1
    }

    fn build_cycle_b() -> u32 {
        match CYCLE_A.try_resolve() {
            Ok(a) => *a * 10,
            Err(AppError::Reentrant(name)) => {
                assert_eq!(name, "CYCLE_A");
                1
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn two_handle_cycle_is_detected() {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send((*CYCLE_A, *CYCLE_B));
        });

        let (a, b) = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("cyclic handles must not block");
        assert_eq!((a, b), (2, 1));
        assert_eq!(CYCLE_A.build_count(), 1);
        assert_eq!(CYCLE_B.build_count(), 1);
    }

    #[test]
    fn unserializable_descriptor_is_an_error() {
        let handle = Handle::new("tuple-keys", || HashMap::from([((1u8, 2u8), 3u8)]));

        let err = handle.try_descriptor().unwrap_err();
        assert!(err.to_string().contains("not representable"), "{err}");
        assert!(handle.is_resolved());

        // The failure is not cached as an empty view.
        assert!(handle.try_descriptor().is_err());
        let lookup = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handle.get("x")));
        assert!(lookup.is_err());
    }

    #[test]
    fn panicking_build_leaves_cell_retryable() {
        let cell: Deferred<u8> = Deferred::new("flaky");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = cell.get_or_build(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(!cell.is_resolved());

        assert_eq!(*cell.get_or_build(|| 5).unwrap(), 5);
        assert_eq!(cell.build_count(), 1);
    }
}
