//! Shared rate-limit bookkeeping.
//!
//! GitHub meters the search endpoints separately from everything else. The
//! [`QuotaTracker`] keeps one window per class, is updated from every
//! response's `X-RateLimit-*` headers, and tells callers how long to wait
//! before the next request. It never sleeps itself, so its lock is only held
//! for the check or the update.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

/// Initial remaining count for the core class.
pub const CORE_INITIAL_REMAINING: u64 = 5000;

/// Initial remaining count for the search class.
pub const SEARCH_INITIAL_REMAINING: u64 = 30;

/// Margin added after a reset instant before requesting again.
const RESET_MARGIN: Duration = Duration::from_secs(1);

// ============================================================================
// Resource Class
// ============================================================================

/// An independently metered class of API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// Everything that is not search, including raw content.
    Core,
    /// `/search/*` endpoints.
    Search,
}

impl ResourceClass {
    /// Guesses the class from a request path.
    pub fn from_path(path: &str) -> Self {
        if path.contains("/search/") {
            Self::Search
        } else {
            Self::Core
        }
    }

    /// Maps an `X-RateLimit-Resource` header value to a class.
    pub fn from_header(value: &str) -> Self {
        match value.trim() {
            "search" | "code_search" => Self::Search,
            _ => Self::Core,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Search => f.write_str("search"),
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// Quota Tracker
// ============================================================================

/// What is known about one class's quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaWindow {
    /// Requests left before the reset.
    pub remaining: u64,
    /// When the quota refills.
    pub reset: DateTime<Utc>,
}

#[derive(Debug)]
struct QuotaState {
    core: QuotaWindow,
    search: QuotaWindow,
}

impl QuotaState {
    fn window_mut(&mut self, class: ResourceClass) -> &mut QuotaWindow {
        match class {
            ResourceClass::Core => &mut self.core,
            ResourceClass::Search => &mut self.search,
        }
    }
}

/// Per-class quota state shared by every request.
pub struct QuotaTracker {
    state: Mutex<QuotaState>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for QuotaTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotaTracker")
            .field("state", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl QuotaTracker {
    /// Creates a tracker on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a tracker on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            state: Mutex::new(QuotaState {
                core: QuotaWindow {
                    remaining: CORE_INITIAL_REMAINING,
                    reset: now,
                },
                search: QuotaWindow {
                    remaining: SEARCH_INITIAL_REMAINING,
                    reset: now,
                },
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current window for a class.
    pub fn window(&self, class: ResourceClass) -> QuotaWindow {
        *self.lock().window_mut(class)
    }

    /// How long a caller must wait before requesting in `class`.
    ///
    /// Returns `None` when more than one request is left or the reset has
    /// already passed.
    pub fn wait_before(&self, class: ResourceClass) -> Option<Duration> {
        let now = self.clock.now();
        let window = *self.lock().window_mut(class);

        if window.remaining > 1 || window.reset <= now {
            return None;
        }

        let until_reset = (window.reset - now).to_std().ok()?;
        Some(until_reset + RESET_MARGIN)
    }

    /// Stores the quota reported by a response.
    ///
    /// `remaining` and `reset_epoch` are left unchanged when the response did
    /// not carry them. Returns the window after the update.
    pub fn record(
        &self,
        class: ResourceClass,
        remaining: Option<u64>,
        reset_epoch: Option<i64>,
    ) -> QuotaWindow {
        let mut state = self.lock();
        let window = state.window_mut(class);

        if let Some(remaining) = remaining {
            window.remaining = remaining;
        }
        if let Some(reset) = reset_epoch.and_then(|secs| Utc.timestamp_opt(secs, 0).single()) {
            window.reset = reset;
        }

        debug!(
            class = %class,
            remaining = window.remaining,
            reset = %window.reset,
            "Quota updated"
        );
        *window
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
