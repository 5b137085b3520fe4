//! Supported interface languages.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Language code used for translations, AI instructions and forecast searches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Hi,
    Ne,
    Es,
    Fr,
    It,
    Ko,
}

impl Language {
    /// Two-letter code, e.g. `"hi"`.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ne => "ne",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::It => "it",
            Language::Ko => "ko",
        }
    }

    /// English name, used when instructing the model which language to answer in.
    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Ne => "Nepali",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::It => "Italian",
            Language::Ko => "Korean",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Ne => "नेपाली",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::It => "Italiano",
            Language::Ko => "한국어",
        }
    }

    /// Whether sign names should be rendered in Devanagari for searches.
    pub fn uses_devanagari(&self) -> bool {
        matches!(self, Language::Hi | Language::Ne)
    }
}
