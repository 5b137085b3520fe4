//! Configuration models.
//!
//! `AppConfig` is persisted as `config.toml`, `SecretConfig` as `secret.json`.
//! Loading and defaults-on-first-run live in the infrastructure crate.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TEXT_MODEL: &str = "liquid/lfm-7b";
pub const DEFAULT_VISION_MODEL: &str = "allenai/molmo-7b-d-0924";
pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com/search";

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub openrouter: OpenRouterSection,
    #[serde(default)]
    pub serpapi: SerpApiSection,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "AstroAI".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterSection {
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    /// Sent as `HTTP-Referer`; OpenRouter uses it for attribution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

impl Default for OpenRouterSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            referer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiSection {
    pub base_url: String,
}

impl Default for SerpApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERPAPI_BASE_URL.to_string(),
        }
    }
}

/// Numeric limits. Every field has a default so partial files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub history_cap: usize,
    pub exit_window_ms: i64,
    pub profile_load_timeout_ms: u64,
    pub chat_context_messages: usize,
    pub chat_transcript_cap: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            history_cap: 50,
            exit_window_ms: 2_000,
            profile_load_timeout_ms: 2_000,
            chat_context_messages: 10,
            chat_transcript_cap: 50,
        }
    }
}

/// A toggleable application feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    PalmReading,
    TarotReading,
    Horoscope,
    DailyForecast,
    AiChat,
    SaveHistoryLocally,
}

/// Feature switches from the `[features]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub palm_reading: bool,
    pub tarot_reading: bool,
    pub horoscope: bool,
    pub daily_forecast: bool,
    pub ai_chat: bool,
    pub save_history_locally: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            palm_reading: true,
            tarot_reading: true,
            horoscope: true,
            daily_forecast: true,
            ai_chat: true,
            save_history_locally: true,
        }
    }
}

impl FeatureFlags {
    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::PalmReading => self.palm_reading,
            Feature::TarotReading => self.tarot_reading,
            Feature::Horoscope => self.horoscope,
            Feature::DailyForecast => self.daily_forecast,
            Feature::AiChat => self.ai_chat,
            Feature::SaveHistoryLocally => self.save_history_locally,
        }
    }
}

/// Root of `secret.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub openrouter: Option<ApiKeyConfig>,
    #[serde(default)]
    pub serpapi: Option<ApiKeyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub api_key: String,
}

impl ApiKeyConfig {
    /// Returns the key when it is non-blank.
    pub fn key(&self) -> Option<&str> {
        let trimmed = self.api_key.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
