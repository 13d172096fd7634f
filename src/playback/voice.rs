//! Voice selection policy — match a synthesis voice to the target locale.

use super::engine::Voice;

/// Pick the best available voice for `locale`.
///
/// Three-step fallback:
/// 1. exact locale match (`"mr-IN"` == `"mr-IN"`),
/// 2. language-prefix match (any voice whose locale starts with the base
///    language code, e.g. `"mr"` matches `"mr-Deva-IN"`),
/// 3. the engine's first available voice.
///
/// Returns `None` only when the voice list is empty; a mismatched language
/// is never an error.
pub fn select_voice<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    if let Some(exact) = voices.iter().find(|v| v.locale == locale) {
        return Some(exact);
    }

    let base = locale.split('-').next().unwrap_or(locale);
    if let Some(prefix) = voices.iter().find(|v| v.locale.starts_with(base)) {
        return Some(prefix);
    }

    voices.first()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
