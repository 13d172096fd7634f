//! Supported assistant languages and their recognizer locales.
//!
//! The app ships in four languages: English, Hindi, Marathi and Kannada.
//! Each maps to a BCP-47-like locale tag used to configure the host speech
//! recognizer (`en-IN`, `hi-IN`, …) and to pick a synthesis voice.
//!
//! The language also selects the localized apology spoken when the remote
//! answering service is unavailable — failures must be *spoken*, since many
//! users never read the screen.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the assistant can listen and speak in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Kannada,
}

impl Language {
    /// ISO 639-1 code (`"en"`, `"hi"`, `"mr"`, `"kn"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Marathi => "mr",
            Self::Kannada => "kn",
        }
    }

    /// Locale tag passed to the host speech engines.
    ///
    /// All four languages use Indian regional variants.
    pub fn locale(&self) -> &'static str {
        match self {
            Self::English => "en-IN",
            Self::Hindi => "hi-IN",
            Self::Marathi => "mr-IN",
            Self::Kannada => "kn-IN",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
            Self::Kannada => "Kannada",
        }
    }

    /// Localized apology spoken when the answering service fails.
    ///
    /// Never cached — the next attempt should hit the service again.
    pub fn apology(&self) -> &'static str {
        match self {
            Self::English => "Sorry, I could not get an answer right now. Please try again.",
            Self::Hindi => "क्षमा करें, अभी उत्तर नहीं मिल सका। कृपया फिर से प्रयास करें।",
            Self::Marathi => "क्षमस्व, सध्या उत्तर मिळू शकले नाही. कृपया पुन्हा प्रयत्न करा.",
            Self::Kannada => "ಕ್ಷಮಿಸಿ, ಈಗ ಉತ್ತರ ಸಿಗಲಿಲ್ಲ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
        }
    }

    /// All supported languages, in UI order.
    pub fn all() -> &'static [Language] {
        &[
            Self::English,
            Self::Hindi,
            Self::Marathi,
            Self::Kannada,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Parse an ISO code or locale tag; `"hi"`, `"hi-IN"` and `"Hindi"` all
    /// resolve to [`Language::Hindi`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let base = lower.split('-').next().unwrap_or(&lower);
        match base {
            "en" | "english" => Ok(Self::English),
            "hi" | "hindi" => Ok(Self::Hindi),
            "mr" | "marathi" => Ok(Self::Marathi),
            "kn" | "kannada" => Ok(Self::Kannada),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognised language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
