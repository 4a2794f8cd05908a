// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Array size policy.
//!
//! Large arrays (images, point clouds, laser scans) would create one series
//! per element. The policy caps that: either every array longer than the
//! limit is dropped for the record, or only its first `max_array_size`
//! elements are expanded. In both cases the decoder still walks past the
//! whole array so the fields after it stay aligned.

use serde::{Deserialize, Serialize};

/// Default element limit.
pub const DEFAULT_MAX_ARRAY_SIZE: usize = 100;

/// Per-load array expansion policy. Immutable for the duration of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayPolicy {
    /// Maximum number of elements expanded into series
    pub max_array_size: usize,
    /// Drop arrays longer than the limit instead of truncating them
    pub discard_large: bool,
}

impl ArrayPolicy {
    /// Create a policy.
    pub fn new(max_array_size: usize, discard_large: bool) -> Self {
        Self {
            max_array_size,
            discard_large,
        }
    }

    /// A policy that expands every element.
    pub fn unlimited() -> Self {
        Self::new(usize::MAX, false)
    }

    /// Whether element `index` of an array of `array_length` elements
    /// produces values.
    pub fn should_expand(&self, array_length: usize, index: usize) -> bool {
        if self.discard_large && array_length > self.max_array_size {
            return false;
        }
        index < self.max_array_size && index < array_length
    }
}

impl Default for ArrayPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ARRAY_SIZE, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_policy() {
        let policy = ArrayPolicy::new(3, false);
        let expanded: Vec<usize> = (0..10).filter(|&i| policy.should_expand(10, i)).collect();
        assert_eq!(expanded, vec![0, 1, 2]);
        assert!(policy.should_expand(2, 1));
        assert!(!policy.should_expand(2, 2));
    }

    #[test]
    fn test_discard_policy() {
        let policy = ArrayPolicy::new(3, true);
        assert!((0..10).all(|i| !policy.should_expand(10, i)));

        // At the limit nothing is discarded.
        assert!((0..3).all(|i| policy.should_expand(3, i)));
    }

    #[test]
    fn test_unlimited_and_default() {
        assert!(ArrayPolicy::unlimited().should_expand(1_000_000, 999_999));

        let policy = ArrayPolicy::default();
        assert_eq!(policy.max_array_size, DEFAULT_MAX_ARRAY_SIZE);
        assert!(policy.discard_large);
    }
}
