//! Card instance identification.
//!
//! Every physical card copy in a match has a unique `InstanceId`.
//! Ids are allocated sequentially by an `InstanceAllocator` owned by the
//! match builder, so the same seed and deck always produce the same ids.
//!
//! ```
//! use dogs_cats_chickens::core::InstanceAllocator;
//!
//! let mut ids = InstanceAllocator::new();
//! let a = ids.alloc();
//! let b = ids.alloc();
//! assert_ne!(a, b);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier of one physical card copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sequential instance id source.
#[derive(Clone, Debug, Default)]
pub struct InstanceAllocator {
    next: u32,
}

impl InstanceAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next unused id.
    pub fn alloc(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_allocation() {
        let mut ids = InstanceAllocator::new();
        let allocated: Vec<_> = (0..5).map(|_| ids.alloc()).collect();

        assert_eq!(allocated[0], InstanceId(0));
        assert_eq!(allocated[4], InstanceId(4));
        assert_eq!(ids.allocated(), 5);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InstanceId(7)), "#7");
    }
}
