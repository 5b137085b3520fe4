use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::normalizer::Normalize;
use crate::user::ZodiacSign;

/// Daily horoscope for one sign. Every field is display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horoscope {
    pub sign: String,
    pub date: String,
    pub mood: String,
    pub lucky_color: String,
    pub lucky_number: String,
    pub lucky_time: String,
    pub overall: String,
    pub love: String,
    pub career: String,
    pub health: String,
    pub advice: String,
}

/// Inputs the horoscope defaults depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoroscopeContext {
    pub sign: ZodiacSign,
    pub date: NaiveDate,
}

impl Normalize for Horoscope {
    type Context = HoroscopeContext;

    fn template(ctx: &HoroscopeContext) -> Self {
        Self {
            sign: ctx.sign.name().to_string(),
            date: ctx.date.format("%Y-%m-%d").to_string(),
            mood: "Positive".to_string(),
            lucky_color: ctx.sign.lucky_color().to_string(),
            lucky_number: ctx.sign.lucky_number().to_string(),
            lucky_time: "10:00 AM - 2:00 PM".to_string(),
            overall: format!(
                "A balanced day for {}. Move at your own pace and notice what feels right.",
                ctx.sign.name()
            ),
            love: "Trust your heart today.".to_string(),
            career: "New opportunities await.".to_string(),
            health: "Take care of your energy.".to_string(),
            advice: "Follow your intuition.".to_string(),
        }
    }

    fn fallback(raw: &str, ctx: &HoroscopeContext) -> Self {
        let raw = raw.trim();
        let mut horoscope = Self::template(ctx);
        if !raw.is_empty() {
            horoscope.overall = raw.to_string();
        }
        horoscope
    }
}
