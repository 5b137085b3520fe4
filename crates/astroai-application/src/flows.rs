//! Screen Flows
//!
//! The user actions of each screen, composed from the services and the
//! navigation controller. Every flow checks its feature flag, holds a
//! request ticket while it waits on the network, and on failure shows an
//! error toast and leaves the screen as it was.

use std::sync::{Arc, Mutex};

use astroai_core::AstroError;
use astroai_core::config::{Feature, FeatureFlags, Limits};
use astroai_core::error::Result;
use astroai_core::forecast::{DailyForecast, ForecastSign};
use astroai_core::history::HistoryKind;
use astroai_core::language::Language;
use astroai_core::navigation::{BackOutcome, ScreenId, ScreenParams};
use astroai_core::notification::Toast;
use astroai_core::reading::{
    ChatMessage, Hand, Horoscope, PalmReading, TarotCard, TarotCategory, TarotReading, TarotSpread,
};
use astroai_core::user::{InitialRoute, ProfileDraft, ZodiacSign};
use astroai_interaction::prepare_palm_image;
use serde::Serialize;
use serde_json::Value;

use crate::forecast_service::ForecastCache;
use crate::history_service::HistoryService;
use crate::navigation_controller::{NavigationController, RequestTicket};
use crate::profile_service::{ProfileService, SaveOutcome};
use crate::reading_service::ReadingService;
use crate::settings_service::SettingsService;
use crate::startup::StartupRouter;

pub const CONNECTION_FAILED: &str = "Connection failed. Please try again.";
pub const READING_FAILED: &str = "Failed to get reading. Please try again.";
pub const ANALYSIS_FAILED: &str = "Analysis failed. Please check your internet and try again.";
pub const HOROSCOPE_FAILED: &str = "Failed to get horoscope. Please try again.";
pub const PROFILE_SAVED: &str = "Profile saved successfully!";
pub const HAPPY_BIRTHDAY: &str = "🎉 Happy Birthday! The stars shine for you today!";
pub const SELECT_CATEGORY: &str = "Please select a category first.";
pub const REVEAL_ALL_CARDS: &str = "Please reveal all 3 cards first.";
pub const FEATURE_DISABLED: &str = "This feature is currently unavailable.";
pub const DATA_DELETED: &str = "All your data has been deleted.";

/// Services the flows are composed from.
#[derive(Debug, Clone)]
pub struct Services {
    pub profiles: Arc<ProfileService>,
    pub history: Arc<HistoryService>,
    pub settings: Arc<SettingsService>,
    pub forecasts: Arc<ForecastCache>,
    pub readings: Arc<ReadingService>,
}

/// A ticket that is released when dropped.
struct ActiveRequest<'a> {
    controller: &'a NavigationController,
    ticket: RequestTicket,
}

impl ActiveRequest<'_> {
    fn is_current(&self) -> bool {
        let current = self.controller.is_current(&self.ticket);
        if !current {
            tracing::debug!(screen = %self.ticket.screen(), "Dropping result for a screen the user left");
        }
        current
    }
}

impl Drop for ActiveRequest<'_> {
    fn drop(&mut self) {
        self.controller.finish_request(&self.ticket);
    }
}

pub struct ScreenFlows {
    controller: Arc<NavigationController>,
    services: Services,
    features: FeatureFlags,
    limits: Limits,
    startup: StartupRouter,
    tarot: Mutex<Option<TarotSpread>>,
    chat: tokio::sync::Mutex<Option<Vec<ChatMessage>>>,
}

impl ScreenFlows {
    pub fn new(
        controller: Arc<NavigationController>,
        services: Services,
        features: FeatureFlags,
        limits: Limits,
    ) -> Self {
        let startup = StartupRouter::new(std::time::Duration::from_millis(
            limits.profile_load_timeout_ms,
        ));
        Self {
            controller,
            services,
            features,
            limits,
            startup,
            tarot: Mutex::new(None),
            chat: tokio::sync::Mutex::new(None),
        }
    }

    pub fn controller(&self) -> &Arc<NavigationController> {
        &self.controller
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Leaves the splash screen once the profile gate has decided.
    pub async fn start(&self) -> Option<InitialRoute> {
        self.controller.recover();
        let route = self.startup.route(&self.services.profiles).await?;
        if let Some(target) = route.target() {
            self.controller.navigate(target, None);
        }
        Some(route)
    }

    /// Saves the profile form. On the first save the navigation is reset so
    /// home becomes the root; later edits return to the previous screen.
    pub async fn complete_profile(&self, draft: ProfileDraft) -> Result<SaveOutcome> {
        let outcome = self.services.profiles.save(draft).await?;

        self.controller.notify(Toast::success(PROFILE_SAVED));
        if outcome.is_birthday {
            self.controller
                .notify(Toast::success(HAPPY_BIRTHDAY).with_duration(5_000));
        }

        if outcome.first_save {
            self.controller.reset_navigation();
        } else {
            self.controller.go_back();
        }
        Ok(outcome)
    }

    /// Stores the language. On the language picker this also moves on:
    /// to onboarding for a new user, back otherwise.
    pub async fn change_language(&self, language: Language) {
        self.services.settings.set_language(language).await;

        if self.controller.current_screen() == ScreenId::Language {
            if self.services.profiles.profile().await.onboarding_complete() {
                self.controller.go_back();
            } else {
                self.controller.navigate(ScreenId::Onboarding, None);
            }
        }
    }

    /// Whether the entertainment-only notice should be shown. It is shown
    /// once per install and does not block any screen.
    pub async fn needs_disclaimer(&self) -> bool {
        !self.services.settings.disclaimer_accepted().await
    }

    pub async fn accept_disclaimer(&self) {
        self.services.settings.accept_disclaimer().await;
    }

    pub async fn analyze_palm(&self, bytes: &[u8], mime: &str, hand: Hand) -> Option<PalmReading> {
        if !self.feature_enabled(Feature::PalmReading) {
            return None;
        }
        let request = self.begin()?;

        let image = match prepare_palm_image(bytes, mime) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Palm image rejected: {}", e);
                self.controller.notify(Toast::warning(user_message(&e, ANALYSIS_FAILED)));
                return None;
            }
        };

        let language = self.services.settings.language().await;
        let result = self.services.readings.read_palm(&image, hand, language).await;
        if !request.is_current() {
            return None;
        }

        match result {
            Ok(normalized) => {
                let reading = normalized.into_record();
                self.services
                    .history
                    .append(HistoryKind::Palm, reading.clone())
                    .await;

                let mut params = record_params(&reading);
                if let Some(params) = params.as_mut() {
                    params.insert("hand".to_string(), Value::String(hand.to_string()));
                }
                self.controller.navigate(ScreenId::PalmResult, params);
                Some(reading)
            }
            Err(e) => {
                tracing::error!("Palm analysis failed: {}", e);
                self.controller.notify(Toast::error(ANALYSIS_FAILED));
                None
            }
        }
    }

    /// Draws a fresh face-down spread for `category`.
    pub fn shuffle_tarot(&self, category: Option<TarotCategory>, deck: &[TarotCard]) -> Option<TarotSpread> {
        if !self.feature_enabled(Feature::TarotReading) {
            return None;
        }
        let Some(category) = category else {
            self.controller.notify(Toast::warning(SELECT_CATEGORY));
            return None;
        };

        match TarotSpread::draw(deck, category, &mut rand::thread_rng()) {
            Ok(spread) => {
                tracing::info!(%category, "Tarot spread drawn");
                *self.lock_tarot() = Some(spread.clone());
                Some(spread)
            }
            Err(e) => {
                tracing::warn!("Cannot draw tarot spread: {}", e);
                self.controller.notify(Toast::error(READING_FAILED));
                None
            }
        }
    }

    /// Turns card `index` face up. Returns `true` if it was face down.
    pub fn reveal_tarot_card(&self, index: usize) -> bool {
        match self.lock_tarot().as_mut() {
            Some(spread) => spread.reveal(index).unwrap_or_else(|e| {
                tracing::warn!("Cannot reveal card: {}", e);
                false
            }),
            None => false,
        }
    }

    pub fn tarot_spread(&self) -> Option<TarotSpread> {
        self.lock_tarot().clone()
    }

    pub async fn request_tarot_reading(&self) -> Option<TarotReading> {
        let Some(spread) = self.tarot_spread() else {
            self.controller.notify(Toast::warning(SELECT_CATEGORY));
            return None;
        };
        if !spread.all_revealed() {
            self.controller.notify(Toast::info(REVEAL_ALL_CARDS));
            return None;
        }
        let request = self.begin()?;

        let language = self.services.settings.language().await;
        let result = self.services.readings.read_tarot(&spread, language).await;
        if !request.is_current() {
            return None;
        }

        match result {
            Ok(normalized) => {
                let reading = TarotReading {
                    category: spread.category,
                    cards: spread.cards,
                    interpretation: normalized.into_record(),
                };
                self.services
                    .history
                    .append(HistoryKind::Tarot, reading.clone())
                    .await;
                *self.lock_tarot() = None;
                self.controller
                    .navigate(ScreenId::TarotReading, record_params(&reading));
                Some(reading)
            }
            Err(e) => {
                tracing::error!("Tarot reading failed: {}", e);
                self.controller.notify(Toast::error(READING_FAILED));
                None
            }
        }
    }

    pub async fn request_horoscope(&self, sign: ZodiacSign) -> Option<Horoscope> {
        if !self.feature_enabled(Feature::Horoscope) {
            return None;
        }
        let request = self.begin()?;

        let profile = self.services.profiles.profile().await;
        let language = self.services.settings.language().await;
        let result = self
            .services
            .readings
            .read_horoscope(sign, Some(profile.name()), language)
            .await;
        if !request.is_current() {
            return None;
        }

        match result {
            Ok(normalized) => {
                let horoscope = normalized.into_record();
                self.controller
                    .navigate(ScreenId::HoroscopeDetail, record_params(&horoscope));
                Some(horoscope)
            }
            Err(e) => {
                tracing::error!(sign = %sign, "Horoscope failed: {}", e);
                self.controller.notify(Toast::error(HOROSCOPE_FAILED));
                None
            }
        }
    }

    /// Opens the daily forecast. Always has something to show.
    pub async fn open_daily_forecast(&self, sign: ForecastSign) -> Option<DailyForecast> {
        if !self.feature_enabled(Feature::DailyForecast) {
            return None;
        }
        let request = self.begin()?;

        let language = self.services.settings.language().await;
        let forecast = self.services.forecasts.get_or_fetch(sign, language).await;
        if !request.is_current() {
            return None;
        }

        self.controller
            .navigate(ScreenId::RashifalDetail, record_params(&forecast));
        Some(forecast)
    }

    /// Sends `text` and returns the assistant's reply. When the gateway
    /// fails the reply is the canned "connection disrupted" message.
    pub async fn send_chat_message(&self, text: &str) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() || !self.feature_enabled(Feature::AiChat) {
            return None;
        }
        let request = self.begin()?;

        let mut transcript = self.chat_transcript().await;
        let question = ChatMessage::user(text);
        self.push_chat(question.clone()).await;
        transcript.push(question);

        let profile = self.services.profiles.profile().await;
        let language = self.services.settings.language().await;
        let result = self
            .services
            .readings
            .chat_reply(&transcript, &profile, language)
            .await;
        if !request.is_current() {
            return None;
        }

        let reply = match result {
            Ok(content) => ChatMessage::assistant(content),
            Err(e) => {
                tracing::error!("Chat reply failed: {}", e);
                self.controller.notify(Toast::error(CONNECTION_FAILED));
                ChatMessage::connection_disrupted()
            }
        };
        self.push_chat(reply.clone()).await;
        Some(reply)
    }

    /// The conversation so far, oldest first.
    pub async fn chat_transcript(&self) -> Vec<ChatMessage> {
        let mut chat = self.chat.lock().await;
        if chat.is_none() {
            *chat = Some(self.services.history.chat_transcript().await);
        }
        chat.clone().unwrap_or_default()
    }

    pub async fn clear_chat(&self) {
        self.services.history.clear(HistoryKind::Chat).await;
        *self.chat.lock().await = Some(Vec::new());
        tracing::info!("Chat cleared");
    }

    /// Wipes all stored data and restarts onboarding.
    pub async fn delete_my_data(&self) {
        self.services.profiles.delete_all_data().await;
        self.services.settings.forget().await;
        self.services.forecasts.forget().await;
        *self.chat.lock().await = None;
        *self.lock_tarot() = None;

        self.controller.replace_root(ScreenId::Language);
        self.controller.notify(Toast::success(DATA_DELETED));
    }

    /// System back gesture; `landed_on` is the entry the platform now shows.
    pub fn back_gesture(&self, landed_on: Option<ScreenId>) -> BackOutcome {
        self.controller.back_gesture(landed_on)
    }

    fn begin(&self) -> Option<ActiveRequest<'_>> {
        self.controller.begin_request().map(|ticket| ActiveRequest {
            controller: &self.controller,
            ticket,
        })
    }

    fn feature_enabled(&self, feature: Feature) -> bool {
        let enabled = self.features.is_enabled(feature);
        if !enabled {
            tracing::info!(%feature, "Feature disabled");
            self.controller.notify(Toast::warning(FEATURE_DISABLED));
        }
        enabled
    }

    fn lock_tarot(&self) -> std::sync::MutexGuard<'_, Option<TarotSpread>> {
        self.tarot.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn push_chat(&self, message: ChatMessage) {
        self.services
            .history
            .append(HistoryKind::Chat, message.clone())
            .await;

        let mut chat = self.chat.lock().await;
        let transcript = chat.get_or_insert_with(Vec::new);
        transcript.push(message);
        let excess = transcript.len().saturating_sub(self.limits.chat_transcript_cap);
        transcript.drain(..excess);
    }
}

impl std::fmt::Debug for ScreenFlows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenFlows")
            .field("features", &self.features)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

/// A record as result-screen parameters.
fn record_params<T: Serialize>(record: &T) -> Option<ScreenParams> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            tracing::warn!("Record is not an object: {}", other);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to serialize screen params: {}", e);
            None
        }
    }
}

/// Text shown for `err`: validation messages as-is, `fallback` otherwise.
fn user_message(err: &AstroError, fallback: &str) -> String {
    match err {
        AstroError::Validation { message, .. } => message.clone(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let err = AstroError::validation("image", "Unsupported image type: image/heic");
        assert_eq!(user_message(&err, ANALYSIS_FAILED), "Unsupported image type: image/heic");
        let err = AstroError::image("corrupt");
        assert_eq!(user_message(&err, ANALYSIS_FAILED), ANALYSIS_FAILED);
    }

    #[test]
    fn test_record_params_are_objects() {
        let params = record_params(&serde_json::json!({"summary": "ok"})).unwrap();
        assert_eq!(params["summary"], "ok");
        assert!(record_params(&"plain").is_none());
    }
}
