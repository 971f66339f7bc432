//! External reference generation.
//!
//! An order's external reference reconciles it with the caller's sales
//! system. When the caller leaves it blank, a reference is generated from
//! the current time. The clock sits behind the [`Clock`] trait so order
//! building stays deterministic under test.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Prefix of generated references, as in `mpqr-1718000000000`.
pub const DEFAULT_REFERENCE_PREFIX: &str = "mpqr";

/// A source of the current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Returns milliseconds elapsed since 1970-01-01T00:00:00Z.
    fn now_millis(&self) -> u64;
}

/// The system wall clock.
///
/// A clock set before the Unix epoch reads as `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        let elapsed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Produces fallback external references.
pub trait ReferenceGenerator: Send + Sync {
    /// Returns a new, non-empty reference.
    fn generate(&self) -> String;
}

impl<G: ReferenceGenerator + ?Sized> ReferenceGenerator for &G {
    fn generate(&self) -> String {
        (**self).generate()
    }
}

/// Generates `{prefix}-{millis}` references from a [`Clock`].
///
/// The millisecond component is strictly increasing per generator: when
/// the clock has not advanced (or went backwards) since the previous call,
/// the last value is bumped by one instead.
///
/// ```rust
/// use mpqr::reference::{ReferenceGenerator, TimestampReferences};
///
/// let references = TimestampReferences::new();
/// let first = references.generate();
/// let second = references.generate();
/// assert!(first.starts_with("mpqr-"));
/// assert_ne!(first, second);
/// ```
#[derive(Debug)]
pub struct TimestampReferences<C = SystemClock> {
    clock: C,
    prefix: String,
    last: AtomicU64,
}

impl TimestampReferences<SystemClock> {
    /// Creates a generator over the system clock with the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimestampReferences<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimestampReferences<C> {
    /// Creates a generator over the given clock with the default prefix.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            prefix: DEFAULT_REFERENCE_PREFIX.to_owned(),
            last: AtomicU64::new(0),
        }
    }

    /// Sets the reference prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the reference prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn next_millis(&self) -> u64 {
        let now = self.clock.now_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = if now > last { now } else { last.saturating_add(1) };
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

impl<C: Clock> ReferenceGenerator for TimestampReferences<C> {
    fn generate(&self) -> String {
        format!("{}-{}", self.prefix, self.next_millis())
    }
}
