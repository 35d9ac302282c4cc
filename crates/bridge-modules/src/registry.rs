//! Module id allocation
//!
//! Ids are process-unique and never reused, even after the descriptor that
//! carried one is destroyed. The builder receives its allocator as a service
//! so tests can substitute a deterministic one; production code uses the
//! process-wide [`ModuleRegistry::global`] counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::defaults::FIRST_MODULE_ID;

/// Unique identifier for a module descriptor
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(u64);

impl ModuleId {
    /// Create a ModuleId from a u64 value
    pub const fn from_u64(id: u64) -> Self {
        ModuleId(id)
    }

    /// Get the numeric ID value
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of module ids.
pub trait IdAllocator: Send + Sync {
    /// Hand out the next id
    fn next_id(&self) -> ModuleId;
}

static GLOBAL_REGISTRY: ModuleRegistry = ModuleRegistry::new();

/// Monotonic id counter.
///
/// Concurrent callers always receive distinct ids. Which caller receives
/// which id is only ordered by the atomic increment itself.
#[derive(Debug)]
pub struct ModuleRegistry {
    next: AtomicU64,
}

impl ModuleRegistry {
    /// Create a counter starting at [`FIRST_MODULE_ID`]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(FIRST_MODULE_ID),
        }
    }

    /// The process-wide counter, never reset
    pub fn global() -> &'static ModuleRegistry {
        &GLOBAL_REGISTRY
    }

    /// Hand out the next id
    pub fn next_id(&self) -> ModuleId {
        ModuleId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Peek at the id the next call will return
    pub fn peek(&self) -> ModuleId {
        ModuleId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for ModuleRegistry {
    fn next_id(&self) -> ModuleId {
        ModuleRegistry::next_id(self)
    }
}

/// Allocator backed by the process-wide registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIds;

impl IdAllocator for ProcessIds {
    fn next_id(&self) -> ModuleId {
        ModuleRegistry::global().next_id()
    }
}
