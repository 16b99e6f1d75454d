//! Prompt enhancement.
//!
//! Composes the prompt sent to the style-transfer service from the user's
//! raw prompt and the style qualifiers of the chosen mode and preset. The
//! composition is deterministic and the raw prompt is always preserved
//! verbatim as a contiguous substring, so the user's intent is present in
//! whatever reaches the diffusion backend.

use crate::catalog::{Mode, Preset};

/// Fixed art-direction prefix applied to every generation.
const PROMPT_PREFIX: &str = "highly detailed QR code art, scannable";

/// Build the final prompt for a generation.
///
/// Shape: `"{prefix}, {raw}, {preset qualifiers}, {mode qualifiers}"`, with
/// blank segments skipped. The paid flow carries no preset, so it is
/// optional. The raw prompt is never paraphrased, trimmed, or truncated:
/// anything non-blank is embedded exactly as the user typed it.
#[must_use]
pub fn enhance_prompt(raw: &str, mode: &Mode, preset: Option<&Preset>) -> String {
    let mut parts = vec![PROMPT_PREFIX];
    if !raw.trim().is_empty() {
        parts.push(raw);
    }
    if let Some(preset) = preset {
        if !preset.prompt_suffix.is_empty() {
            parts.push(preset.prompt_suffix);
        }
    }
    if !mode.prompt_suffix.is_empty() {
        parts.push(mode.prompt_suffix);
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    #[test]
    fn raw_prompt_survives_verbatim_for_every_catalog_pair() {
        let catalog = Catalog::builtin();
        let raw = "underwater coral reef with bioluminescent elements";

        for mode in catalog.modes() {
            let without_preset = enhance_prompt(raw, mode, None);
            assert!(without_preset.contains(raw), "raw prompt lost for {}", mode.id);

            for preset in catalog.presets() {
                let enhanced = enhance_prompt(raw, mode, Some(preset));
                assert!(
                    enhanced.contains(raw),
                    "raw prompt lost for mode={} preset={}",
                    mode.id,
                    preset.id
                );
            }
        }
    }

    #[test]
    fn enhancement_is_deterministic() {
        let catalog = Catalog::builtin();
        let mode = catalog.mode("holographic").unwrap();
        let preset = catalog.preset("preset_1").unwrap();

        let a = enhance_prompt("sunset", mode, Some(preset));
        let b = enhance_prompt("sunset", mode, Some(preset));
        assert_eq!(a, b);
    }

    #[test]
    fn whitespace_padded_prompt_is_embedded_untrimmed() {
        let catalog = Catalog::builtin();
        let mode = catalog.mode("static").unwrap();
        let preset = catalog.preset("preset_1").unwrap();
        let raw = "  neon city  ";

        assert!(enhance_prompt(raw, mode, None).contains(raw));
        assert!(enhance_prompt(raw, mode, Some(preset)).contains(raw));
    }

    #[test]
    fn empty_raw_prompt_still_produces_a_usable_prompt() {
        let catalog = Catalog::builtin();
        let mode = catalog.mode("static").unwrap();
        let preset = catalog.preset("preset_3").unwrap();

        let enhanced = enhance_prompt("  ", mode, Some(preset));
        assert!(enhanced.starts_with(PROMPT_PREFIX));
        assert!(!enhanced.contains(", ,"));
    }

    #[test]
    fn mode_qualifiers_are_included() {
        let catalog = Catalog::builtin();
        let mode = catalog.mode("holographic").unwrap();
        let preset = catalog.preset("preset_1").unwrap();

        let enhanced = enhance_prompt("sunset", mode, Some(preset));
        assert!(enhanced.contains("holographic shimmer"));
        assert!(enhanced.contains(preset.prompt_suffix));
    }
}
