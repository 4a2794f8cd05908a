// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel selection for container reads.

use std::collections::BTreeSet;

/// Which channels a read should yield.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TopicFilter {
    /// Every channel
    #[default]
    All,
    /// Only the named channels
    Include(BTreeSet<String>),
}

impl TopicFilter {
    /// Check if a channel should be read.
    pub fn should_include(&self, channel: &str) -> bool {
        match self {
            TopicFilter::All => true,
            TopicFilter::Include(channels) => channels.contains(channel),
        }
    }

    /// Create an include filter from channel names.
    pub fn include<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(channels.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include() {
        let include = TopicFilter::include(["/a", "/b"]);
        assert!(include.should_include("/a"));
        assert!(!include.should_include("/c"));

        assert!(TopicFilter::All.should_include("/anything"));
        assert_eq!(TopicFilter::include(Vec::<String>::new()), TopicFilter::Include(BTreeSet::new()));
    }
}
