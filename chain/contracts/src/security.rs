//! Reentrancy guard
//!
//! A guarded operation holds an [`Entered`] token for its whole body, external
//! calls included. Any nested attempt to enter while the token is alive is
//! rejected before running, and counted so the outer call can report it.
//! Dropping the token frees the guard on every exit path, `?` returns and
//! panics included.

use std::cell::Cell;

use crate::errors::VaultError;

/// Reentrancy guard preventing nested calls into protected functions.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    locked: Cell<bool>,
    rejected: Cell<u32>,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for the lifetime of the returned token.
    pub fn enter(&self) -> Result<Entered<'_>, VaultError> {
        if self.locked.get() {
            self.rejected.set(self.rejected.get().saturating_add(1));
            return Err(VaultError::Reentrancy);
        }
        self.locked.set(true);
        self.rejected.set(0);
        Ok(Entered { guard: self })
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Entries rejected since the current holder acquired the guard.
    pub fn rejected_attempts(&self) -> u32 {
        self.rejected.get()
    }
}

/// Proof that the guard is held. Releases it on drop.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct Entered<'a> {
    guard: &'a ReentrancyGuard,
}

impl Entered<'_> {
    /// Nested entries rejected while this token was held.
    pub fn rejected_attempts(&self) -> u32 {
        self.guard.rejected_attempts()
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.guard.locked.set(false);
    }
}
