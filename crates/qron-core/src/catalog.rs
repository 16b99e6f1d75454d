//! The mode / preset / plan catalog.
//!
//! Catalog data is immutable for the lifetime of the process. It is built
//! once at startup and passed by reference through application state rather
//! than read from ambient globals, so tests can substitute a reduced
//! catalog and the entitlement check stays a pure function of its inputs.

use serde::Serialize;

use crate::Tier;

// ============================================================================
// Constants
// ============================================================================

/// Monthly generation limit for the free plan.
pub const FREE_PLAN_GENERATIONS: u32 = 10;

/// Monthly generation limit for the pro plan.
pub const PRO_PLAN_GENERATIONS: u32 = 500;

/// Pro plan monthly price in cents ($9.99).
pub const PRO_PLAN_PRICE_CENTS: i64 = 999;

/// Enterprise plan monthly price in cents ($499).
pub const ENTERPRISE_PLAN_PRICE_CENTS: i64 = 49900;

/// A generation mode: a named visual/behavioral style with a required tier.
#[derive(Debug, Clone, Serialize)]
pub struct Mode {
    /// Stable mode identifier (e.g. "static", "kinetic").
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Minimum tier required to generate in this mode.
    pub tier: Tier,
    /// Feature tags shown in the mode picker.
    pub features: &'static [&'static str],
    /// One-off purchase price in cents for the pay-per-QRON flow.
    pub price_cents: i64,
    /// Style qualifiers appended by prompt enhancement.
    #[serde(skip)]
    pub prompt_suffix: &'static str,
}

/// A style preset applied on top of a mode.
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    /// Stable preset identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Whether this preset is gated behind the pro tier.
    pub is_premium: bool,
    /// Declared tier. Premium presets are treated as pro regardless.
    pub tier: Tier,
    /// Style qualifiers appended by prompt enhancement.
    #[serde(skip)]
    pub prompt_suffix: &'static str,
}

impl Preset {
    /// The tier actually required to use this preset.
    ///
    /// Premium presets require pro even if their declared tier says free.
    #[must_use]
    pub fn required_tier(&self) -> Tier {
        if self.is_premium && self.tier < Tier::Pro {
            Tier::Pro
        } else {
            self.tier
        }
    }
}

/// A subscription plan.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Stable plan identifier, matching the tier name.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Monthly price in cents.
    pub price_cents: i64,
    /// The tier this plan grants.
    pub tier: Tier,
    /// Monthly generation limit. `None` means unlimited.
    pub generations_limit: Option<u32>,
}

/// The full catalog of modes, presets, and plans.
#[derive(Debug, Clone)]
pub struct Catalog {
    modes: Vec<Mode>,
    presets: Vec<Preset>,
    plans: Vec<Plan>,
}

impl Catalog {
    /// Build the catalog from explicit entries.
    #[must_use]
    pub fn new(modes: Vec<Mode>, presets: Vec<Preset>, plans: Vec<Plan>) -> Self {
        Self {
            modes,
            presets,
            plans,
        }
    }

    /// The built-in production catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_modes(), builtin_presets(), builtin_plans())
    }

    /// Look up a mode by id.
    #[must_use]
    pub fn mode(&self, id: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Look up a preset by id.
    #[must_use]
    pub fn preset(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Look up a plan by id.
    #[must_use]
    pub fn plan(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// All modes, in catalog order.
    #[must_use]
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// All presets, in catalog order.
    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// All plans, in catalog order.
    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }
}

fn builtin_modes() -> Vec<Mode> {
    vec![
        Mode {
            id: "static",
            name: "Static",
            description: "AI-styled QR code",
            tier: Tier::Free,
            features: &["AI styling", "High resolution", "Instant generation"],
            price_cents: 500,
            prompt_suffix: "clean composition, crisp edges",
        },
        Mode {
            id: "stereographic",
            name: "Stereographic",
            description: "3D depth effect",
            tier: Tier::Free,
            features: &["3D depth", "Parallax effect", "Cross-eye viewable"],
            price_cents: 1000,
            prompt_suffix: "stereographic depth, dimensional parallax",
        },
        Mode {
            id: "kinetic",
            name: "Kinetic",
            description: "Animated motion QR",
            tier: Tier::Pro,
            features: &["Video output", "Smooth animation", "Loop-ready"],
            price_cents: 1000,
            prompt_suffix: "sense of motion, flowing energy trails",
        },
        Mode {
            id: "holographic",
            name: "Holographic",
            description: "Shimmer & shift",
            tier: Tier::Pro,
            features: &["Color shift", "Holographic foil", "Premium look"],
            price_cents: 1500,
            prompt_suffix: "holographic shimmer, iridescent, clear structure",
        },
        Mode {
            id: "memory",
            name: "Memory",
            description: "Mint as NFT",
            tier: Tier::Pro,
            features: &["On-chain", "Own forever", "Tradeable"],
            price_cents: 1500,
            prompt_suffix: "collectible artwork, gallery finish",
        },
        Mode {
            id: "echo",
            name: "Echo",
            description: "Ultrasonic enabled",
            tier: Tier::Pro,
            features: &["Sound trigger", "Proximity detect", "Chirp.io"],
            price_cents: 1200,
            prompt_suffix: "concentric ripples, resonant waveforms",
        },
        Mode {
            id: "temporal",
            name: "Temporal",
            description: "Time-based evolution",
            tier: Tier::Enterprise,
            features: &["Scheduled changes", "Day/night modes", "Event triggers"],
            price_cents: 2000,
            prompt_suffix: "shifting light, passage of time",
        },
        Mode {
            id: "reactive",
            name: "Reactive",
            description: "Environment-aware",
            tier: Tier::Enterprise,
            features: &["Weather sync", "Location aware", "Context adaptive"],
            price_cents: 2000,
            prompt_suffix: "environmental texture, adaptive palette",
        },
        Mode {
            id: "layered",
            name: "Layered",
            description: "Multi-composition",
            tier: Tier::Enterprise,
            features: &["Multiple layers", "Blend modes", "Complex designs"],
            price_cents: 1200,
            prompt_suffix: "layered composition, translucent overlays",
        },
        Mode {
            id: "dimensional",
            name: "Dimensional",
            description: "AR-ready spatial",
            tier: Tier::Enterprise,
            features: &["AR compatible", "Spatial anchor", "3D placement"],
            price_cents: 2500,
            prompt_suffix: "volumetric form, spatial depth",
        },
        Mode {
            id: "living",
            name: "Living",
            description: "Self-evolving AI",
            tier: Tier::Enterprise,
            features: &["AI evolution", "Learns & adapts", "Truly alive"],
            price_cents: 3000,
            prompt_suffix: "organic growth, living detail",
        },
    ]
}

fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "preset_1",
            name: "Vibrant Flow",
            description: "Dynamic and colorful patterns.",
            is_premium: false,
            tier: Tier::Free,
            prompt_suffix: "vibrant flowing colors, dynamic patterns",
        },
        Preset {
            id: "preset_2",
            name: "Cybernetic Bloom",
            description: "Futuristic, glowing, and organic.",
            is_premium: true,
            tier: Tier::Pro,
            prompt_suffix: "futuristic glowing circuitry, organic bloom",
        },
        Preset {
            id: "preset_3",
            name: "Subtle Hues",
            description: "Minimalist, soft, and elegant.",
            is_premium: false,
            tier: Tier::Free,
            prompt_suffix: "minimalist soft hues, elegant restraint",
        },
        Preset {
            id: "preset_4",
            name: "Geometric Grid",
            description: "Sharp lines and intricate geometric forms.",
            is_premium: true,
            tier: Tier::Pro,
            prompt_suffix: "sharp geometric lines, intricate grid forms",
        },
        Preset {
            id: "preset_5",
            name: "Organic Swirl",
            description: "Smooth, natural curves and flowing shapes.",
            is_premium: true,
            tier: Tier::Pro,
            prompt_suffix: "smooth natural curves, flowing organic shapes",
        },
    ]
}

fn builtin_plans() -> Vec<Plan> {
    vec![
        Plan {
            id: "free",
            name: "Free",
            price_cents: 0,
            tier: Tier::Free,
            generations_limit: Some(FREE_PLAN_GENERATIONS),
        },
        Plan {
            id: "pro",
            name: "Pro",
            price_cents: PRO_PLAN_PRICE_CENTS,
            tier: Tier::Pro,
            generations_limit: Some(PRO_PLAN_GENERATIONS),
        },
        Plan {
            id: "enterprise",
            name: "Enterprise",
            price_cents: ENTERPRISE_PLAN_PRICE_CENTS,
            tier: Tier::Enterprise,
            generations_limit: None,
        },
    ]
}
