use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::language::Language;
use crate::user::{Rashi, ZodiacSign};

/// The sign a forecast is requested for, western or Vedic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "system", content = "sign", rename_all = "lowercase")]
pub enum ForecastSign {
    Zodiac(ZodiacSign),
    Rashi(Rashi),
}

impl ForecastSign {
    /// Identifier used in cache keys, e.g. `"leo"` or `"simha"`.
    pub fn id(&self) -> &str {
        match self {
            ForecastSign::Zodiac(sign) => sign.id(),
            ForecastSign::Rashi(rashi) => rashi.id(),
        }
    }

    /// Western sign used to phrase searches.
    pub fn western(&self) -> ZodiacSign {
        match self {
            ForecastSign::Zodiac(sign) => *sign,
            ForecastSign::Rashi(rashi) => rashi.western(),
        }
    }
}

impl From<ZodiacSign> for ForecastSign {
    fn from(sign: ZodiacSign) -> Self {
        ForecastSign::Zodiac(sign)
    }
}

impl From<Rashi> for ForecastSign {
    fn from(rashi: Rashi) -> Self {
        ForecastSign::Rashi(rashi)
    }
}

/// Identity of one day's forecast.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    pub date: NaiveDate,
    pub sign: String,
    pub lang: Language,
}

impl ForecastKey {
    pub fn new(date: NaiveDate, sign: ForecastSign, lang: Language) -> Self {
        Self {
            date,
            sign: sign.id().to_string(),
            lang,
        }
    }
}

/// The single persisted forecast slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastCacheEntry {
    pub date: NaiveDate,
    pub sign: String,
    pub lang: Language,
    pub text: String,
}

impl ForecastCacheEntry {
    pub fn new(key: &ForecastKey, text: impl Into<String>) -> Self {
        Self {
            date: key.date,
            sign: key.sign.clone(),
            lang: key.lang,
            text: text.into(),
        }
    }

    /// A hit requires the day, the sign and the language to all match.
    pub fn matches(&self, key: &ForecastKey) -> bool {
        self.date == key.date && self.sign == key.sign && self.lang == key.lang
    }
}

/// Where a forecast's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum ForecastOrigin {
    Cached,
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub sign: String,
    pub date: NaiveDate,
    pub language: Language,
    pub text: String,
    pub origin: ForecastOrigin,
}

impl DailyForecast {
    pub fn new(key: &ForecastKey, text: impl Into<String>, origin: ForecastOrigin) -> Self {
        Self {
            sign: key.sign.clone(),
            date: key.date,
            language: key.lang,
            text: text.into(),
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_matches_all_three_keys() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let key = ForecastKey::new(day, ZodiacSign::Leo.into(), Language::En);
        let entry = ForecastCacheEntry::new(&key, "Bright day");
        assert!(entry.matches(&key));

        let other_lang = ForecastKey::new(day, ZodiacSign::Leo.into(), Language::Hi);
        let other_sign = ForecastKey::new(day, ZodiacSign::Virgo.into(), Language::En);
        let other_day = ForecastKey::new(day.succ_opt().unwrap(), ZodiacSign::Leo.into(), Language::En);
        assert!(!entry.matches(&other_lang));
        assert!(!entry.matches(&other_sign));
        assert!(!entry.matches(&other_day));
    }

    #[test]
    fn test_entry_shape() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let key = ForecastKey::new(day, Rashi::Simha.into(), Language::Hi);
        let value = serde_json::to_value(ForecastCacheEntry::new(&key, "शुभ दिन")).unwrap();
        assert_eq!(
            value,
            json!({"date": "2024-05-02", "sign": "simha", "lang": "hi", "text": "शुभ दिन"})
        );
    }
}
