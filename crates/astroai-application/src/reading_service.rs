//! Reading Service
//!
//! Builds gateway requests for each reading feature and normalizes the
//! replies into complete records. Gateway failures are returned to the
//! caller; malformed replies never are.

use std::sync::Arc;

use astroai_core::clock::Clock;
use astroai_core::config::{Limits, OpenRouterSection};
use astroai_core::error::Result;
use astroai_core::gateway::{AiGateway, ContentPart, GatewayMessage, GatewayRequest, MessageContent};
use astroai_core::language::Language;
use astroai_core::reading::chat::recent_context;
use astroai_core::reading::{
    ChatMessage, ChatRole, Hand, Horoscope, HoroscopeContext, Normalized, PalmReading,
    TarotInterpretation, TarotSpread, normalize,
};
use astroai_core::user::{UserProfile, ZodiacSign};
use astroai_interaction::PalmImage;

use crate::prompts::Prompts;

/// Models used for text and image requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChoice {
    pub text: String,
    pub vision: String,
}

impl From<&OpenRouterSection> for ModelChoice {
    fn from(section: &OpenRouterSection) -> Self {
        Self {
            text: section.text_model.clone(),
            vision: section.vision_model.clone(),
        }
    }
}

pub struct ReadingService {
    gateway: Arc<dyn AiGateway>,
    prompts: Prompts,
    models: ModelChoice,
    clock: Arc<dyn Clock>,
    chat_context: usize,
}

impl ReadingService {
    pub fn new(
        gateway: Arc<dyn AiGateway>,
        models: ModelChoice,
        clock: Arc<dyn Clock>,
        limits: &Limits,
    ) -> Result<Self> {
        Ok(Self {
            gateway,
            prompts: Prompts::new()?,
            models,
            clock,
            chat_context: limits.chat_context_messages,
        })
    }

    pub async fn read_palm(
        &self,
        image: &PalmImage,
        hand: Hand,
        language: Language,
    ) -> Result<Normalized<PalmReading>> {
        let (system, user) = self.prompts.palm(hand, language)?;
        let request = GatewayRequest::new(system, &self.models.vision)
            .with_message(GatewayMessage::user(MessageContent::Parts(vec![
                ContentPart::Text { text: user },
                ContentPart::ImageUrl {
                    url: image.data_uri.clone(),
                },
            ])))
            .with_max_tokens(2_000)
            .with_temperature(0.7);

        let raw = self.gateway.complete(request).await?;
        let reading = normalize::<PalmReading>(&raw, &());
        log_outcome("palm", reading.is_fallback());
        Ok(reading)
    }

    pub async fn read_tarot(
        &self,
        spread: &TarotSpread,
        language: Language,
    ) -> Result<Normalized<TarotInterpretation>> {
        let (system, user) = self.prompts.tarot(spread, language)?;
        let request = GatewayRequest::new(system, &self.models.text)
            .with_message(GatewayMessage::user(user))
            .with_max_tokens(1_500)
            .with_temperature(0.8);

        let raw = self.gateway.complete(request).await?;
        let interpretation = normalize::<TarotInterpretation>(&raw, &());
        log_outcome("tarot", interpretation.is_fallback());
        Ok(interpretation)
    }

    pub async fn read_horoscope(
        &self,
        sign: ZodiacSign,
        reader_name: Option<&str>,
        language: Language,
    ) -> Result<Normalized<Horoscope>> {
        let ctx = HoroscopeContext {
            sign,
            date: self.clock.today(),
        };
        let date = ctx.date.format("%A, %B %-d, %Y").to_string();
        let (system, user) = self.prompts.horoscope(sign, &date, reader_name, language)?;
        let request = GatewayRequest::new(system, &self.models.text)
            .with_message(GatewayMessage::user(user))
            .with_max_tokens(1_200)
            .with_temperature(0.8);

        let raw = self.gateway.complete(request).await?;
        let horoscope = normalize::<Horoscope>(&raw, &ctx);
        log_outcome("horoscope", horoscope.is_fallback());
        Ok(horoscope)
    }

    /// Assistant reply to the last message of `transcript`, which must
    /// already include the user's new message.
    pub async fn chat_reply(
        &self,
        transcript: &[ChatMessage],
        profile: &UserProfile,
        language: Language,
    ) -> Result<String> {
        let system = self
            .prompts
            .chat(profile.name(), profile.zodiac_sign(), language)?;
        let history = recent_context(transcript, self.chat_context)
            .iter()
            .map(|message| match message.role {
                ChatRole::User => GatewayMessage::user(message.content.as_str()),
                ChatRole::Assistant => GatewayMessage::assistant(message.content.as_str()),
            });
        let request = GatewayRequest::new(system, &self.models.text)
            .with_history(history)
            .with_max_tokens(1_000)
            .with_temperature(0.8);

        let reply = self.gateway.complete(request).await?;
        Ok(reply.trim().to_string())
    }
}

fn log_outcome(feature: &str, fallback: bool) {
    if fallback {
        tracing::warn!(feature, "Reply was not valid JSON, using fallback record");
    } else {
        tracing::debug!(feature, "Reply normalized");
    }
}

impl std::fmt::Debug for ReadingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingService")
            .field("models", &self.models)
            .field("chat_context", &self.chat_context)
            .finish_non_exhaustive()
    }
}
