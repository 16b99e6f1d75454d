//! The entitlement check.
//!
//! Decides whether a profile may generate with a given (mode, preset) pair.
//! The check is pure: it reads the profile and the catalog and produces
//! either a grant carrying the resolved entries or a denial. It runs
//! server-side on every generation request; any client-side copy of these
//! rules is advisory only.

use crate::catalog::{Catalog, Mode, Preset};
use crate::{Profile, Tier};

/// A successful entitlement check, carrying the resolved catalog entries.
#[derive(Debug, Clone, Copy)]
pub struct Grant<'a> {
    /// The resolved mode.
    pub mode: &'a Mode,
    /// The resolved preset.
    pub preset: &'a Preset,
}

/// Why an entitlement check failed.
///
/// The first failing check wins; there is no partial allowance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    /// The mode id does not resolve in the catalog.
    #[error("invalid mode: {0}")]
    UnknownMode(String),

    /// The preset id does not resolve in the catalog.
    #[error("invalid preset: {0}")]
    UnknownPreset(String),

    /// The generation quota is exhausted.
    #[error("generation limit reached ({used}/{limit})")]
    LimitReached {
        /// Generations consumed this period.
        used: u32,
        /// The period allowance.
        limit: u32,
    },

    /// The profile's tier is below what the mode or preset requires.
    #[error("upgrade to {required} required")]
    TierRequired {
        /// The minimum tier that would be allowed.
        required: Tier,
    },
}

impl Denial {
    /// Whether this denial is a request-shape problem rather than a
    /// tier/quota one. Unknown ids map to 400, the rest to 403.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::UnknownMode(_) | Self::UnknownPreset(_))
    }
}

/// Check whether `profile` may generate with `mode_id` + `preset_id`.
///
/// Evaluation order, first failure wins:
///
/// 1. the mode must exist,
/// 2. the preset must exist,
/// 3. non-enterprise profiles must have quota remaining,
/// 4. the profile's tier must cover the mode's required tier,
/// 5. the profile's tier must cover the preset's required tier
///    (premium presets require pro regardless of their declared tier).
///
/// # Errors
///
/// Returns the first applicable [`Denial`].
pub fn check_entitlement<'a>(
    profile: &Profile,
    catalog: &'a Catalog,
    mode_id: &str,
    preset_id: &str,
) -> Result<Grant<'a>, Denial> {
    let mode = catalog
        .mode(mode_id)
        .ok_or_else(|| Denial::UnknownMode(mode_id.to_string()))?;

    let preset = catalog
        .preset(preset_id)
        .ok_or_else(|| Denial::UnknownPreset(preset_id.to_string()))?;

    if !profile.has_quota() {
        return Err(Denial::LimitReached {
            used: profile.generations_used,
            limit: profile.generations_limit,
        });
    }

    if !profile.tier.allows(mode.tier) {
        return Err(Denial::TierRequired {
            required: mode.tier,
        });
    }

    let preset_tier = preset.required_tier();
    if !profile.tier.allows(preset_tier) {
        return Err(Denial::TierRequired {
            required: preset_tier,
        });
    }

    Ok(Grant { mode, preset })
}
