//! Unique-name generation for dependent resources.
//!
//! Names are a fixed prefix plus a random 4-digit suffix. Collisions are
//! accepted as possible; the backend's "already exists" error is the
//! authoritative signal, and the workflow retries with a fresh name.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUFFIX_MIN: u16 = 1000;
pub const SUFFIX_MAX: u16 = 9999;

/// A generated `prefix-####` resource name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueName {
    prefix: String,
    suffix: u16,
}

impl UniqueName {
    /// Generate a name with a fresh random suffix.
    pub fn generate(prefix: &str) -> Self {
        let suffix = rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX);
        Self {
            prefix: prefix.to_string(),
            suffix,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> u16 {
        self.suffix
    }
}

impl fmt::Display for UniqueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_stays_in_range() {
        for _ in 0..500 {
            let name = UniqueName::generate("pp-vnet-policy");
            assert!(name.suffix() >= SUFFIX_MIN);
            assert!(name.suffix() <= SUFFIX_MAX);
        }
    }

    #[test]
    fn test_display_format() {
        let name = UniqueName::generate("pp-vnet-policy");
        let rendered = name.to_string();

        let (prefix, suffix) = rendered.rsplit_once('-').unwrap();
        assert_eq!(prefix, "pp-vnet-policy");
        assert_eq!(suffix.len(), 4);
        assert_eq!(suffix.parse::<u16>().unwrap(), name.suffix());
    }
}
