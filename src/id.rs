//! Identifier minting.
//!
//! The middleware mints one identifier per request. Uniqueness is up to the
//! minter; implementations synchronize themselves when shared across requests.

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Produces a new identifier string on every call.
pub trait MakeId: Clone + Send + Sync + 'static {
    fn make_id(&self) -> String;
}

impl<F> MakeId for F
where
    F: Fn() -> String + Clone + Send + Sync + 'static,
{
    fn make_id(&self) -> String {
        self()
    }
}

/// Mints random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeUuid;

impl MakeId for MakeUuid {
    fn make_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Mints "0", "1", "2", ... from a counter shared by all clones.
#[derive(Debug, Clone, Default)]
pub struct SequentialId {
    next: Arc<AtomicU64>,
}

impl SequentialId {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first identifier is `start`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(start)),
        }
    }
}

impl MakeId for SequentialId {
    fn make_id(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

/// Adapts a constructor of any displayable value into an identifier minter,
/// e.g. `from_display(Uuid::new_v4)`.
pub fn from_display<F, D>(make: F) -> impl Fn() -> String + Clone + Send + Sync + 'static
where
    F: Fn() -> D + Clone + Send + Sync + 'static,
    D: Display,
{
    move || make().to_string()
}
