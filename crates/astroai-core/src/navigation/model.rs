use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Data handed to the screen being opened, e.g. a finished reading record.
pub type ScreenParams = Map<String, Value>;

/// Every full-viewport state of the application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScreenId {
    Splash,
    Language,
    Onboarding,
    ProfileSetup,
    Home,
    PalmScan,
    PalmResult,
    Chat,
    Tarot,
    TarotReading,
    Horoscope,
    HoroscopeDetail,
    Rashifal,
    RashifalDetail,
    History,
    Settings,
    PrivacyPolicy,
    About,
    Terms,
}

impl ScreenId {
    /// Resolves a route name such as `"palm_scan"` or `"PALM_SCAN"`.
    ///
    /// Unknown routes land on [`ScreenId::Home`].
    pub fn from_route(route: &str) -> Self {
        match route.trim().trim_start_matches('#').parse() {
            Ok(screen) => screen,
            Err(_) => {
                tracing::warn!(route, "Unknown route, falling back to home");
                ScreenId::Home
            }
        }
    }

    /// Hash fragment used for history entries, e.g. `#palm_scan`.
    pub fn fragment(&self) -> String {
        format!("#{}", self.as_ref())
    }

    /// Screens reachable before a profile exists.
    pub fn is_pre_onboarding(&self) -> bool {
        matches!(
            self,
            ScreenId::Splash | ScreenId::Language | ScreenId::Onboarding | ScreenId::ProfileSetup
        )
    }
}

/// Snapshot of the navigation state.
///
/// `history_stack` is most-recent-last and never contains
/// [`ScreenId::Splash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenState {
    pub current_screen: ScreenId,
    pub params: Option<ScreenParams>,
    pub history_stack: Vec<ScreenId>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            current_screen: ScreenId::Splash,
            params: None,
            history_stack: Vec::new(),
        }
    }
}
