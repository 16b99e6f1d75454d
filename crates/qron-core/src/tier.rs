//! Subscription tiers.
//!
//! Tiers form a strict order: free < pro < enterprise. All tier-gating in the
//! platform goes through [`Tier::allows`] so the comparison cannot drift
//! between call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Free tier: limited monthly generations, free modes and presets only.
    Free,

    /// Pro tier: higher limits, premium presets, pro modes.
    Pro,

    /// Enterprise tier: unlimited generations, all modes.
    Enterprise,
}

impl Tier {
    /// Numeric rank used for ordering comparisons.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Free => 0,
            Self::Pro => 1,
            Self::Enterprise => 2,
        }
    }

    /// Whether a profile at this tier may use a feature requiring `required`.
    #[must_use]
    pub const fn allows(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Whether this tier has an unlimited generation quota.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Enterprise)
    }

    /// The tier identifier as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized tier name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct UnknownTier(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_strictly_ordered() {
        assert!(Tier::Free < Tier::Pro);
        assert!(Tier::Pro < Tier::Enterprise);
    }

    #[test]
    fn allows_is_reflexive_and_monotonic() {
        let tiers = [Tier::Free, Tier::Pro, Tier::Enterprise];
        for have in tiers {
            for need in tiers {
                assert_eq!(have.allows(need), have.rank() >= need.rank());
            }
        }
    }

    #[test]
    fn only_enterprise_is_unlimited() {
        assert!(!Tier::Free.is_unlimited());
        assert!(!Tier::Pro.is_unlimited());
        assert!(Tier::Enterprise.is_unlimited());
    }

    #[test]
    fn parse_roundtrip() {
        for tier in [Tier::Free, Tier::Pro, Tier::Enterprise] {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert!("platinum".parse::<Tier>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Tier::Enterprise).unwrap();
        assert_eq!(json, "\"enterprise\"");
    }
}
