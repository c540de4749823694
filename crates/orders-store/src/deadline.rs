//! Caller-supplied deadlines.

use std::time::{Duration, Instant};

use crate::error::{Result, StoreError};

/// The point in time by which a store operation must finish.
///
/// Operations check the deadline before touching the backend and again just
/// before committing. An expired deadline discards the open transaction, so a
/// multi-step mutation is either fully applied or not applied at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never expires.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// A deadline at a fixed instant.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// A deadline `timeout` from now.
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now().checked_add(timeout))
    }

    /// Returns `true` once the deadline has passed.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Fail with [`StoreError::Timeout`] if the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Timeout` when expired.
    pub fn check(&self) -> Result<()> {
        if self.expired() {
            return Err(StoreError::Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_expires() {
        let deadline = Deadline::none();
        assert!(!deadline.expired());
        assert!(deadline.check().is_ok());
    }

    #[test]
    fn past_deadline_is_expired() {
        let deadline = Deadline::at(Instant::now());
        assert!(deadline.expired());
        assert!(matches!(deadline.check(), Err(StoreError::Timeout)));
    }

    #[test]
    fn future_deadline_is_live() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.expired());
        assert!(deadline.check().is_ok());
    }
}
