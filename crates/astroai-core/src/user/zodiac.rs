//! Western zodiac signs and Vedic rashis.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Western sun sign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Derives the sign from a birth date using the tropical month/day cusps.
    pub fn from_date(date: NaiveDate) -> Self {
        let (month, day) = (date.month(), date.day());
        match (month, day) {
            (3, 21..) | (4, ..=19) => ZodiacSign::Aries,
            (4, _) | (5, ..=20) => ZodiacSign::Taurus,
            (5, _) | (6, ..=20) => ZodiacSign::Gemini,
            (6, _) | (7, ..=22) => ZodiacSign::Cancer,
            (7, _) | (8, ..=22) => ZodiacSign::Leo,
            (8, _) | (9, ..=22) => ZodiacSign::Virgo,
            (9, _) | (10, ..=22) => ZodiacSign::Libra,
            (10, _) | (11, ..=21) => ZodiacSign::Scorpio,
            (11, _) | (12, ..=21) => ZodiacSign::Sagittarius,
            (12, _) | (1, ..=19) => ZodiacSign::Capricorn,
            (1, _) | (2, ..=18) => ZodiacSign::Aquarius,
            _ => ZodiacSign::Pisces,
        }
    }

    /// Lowercase identifier, e.g. `"cancer"`.
    pub fn id(&self) -> &str {
        self.as_ref()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }

    /// Devanagari name used for Hindi and Nepali searches.
    pub fn devanagari_name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "मेष",
            ZodiacSign::Taurus => "वृषभ",
            ZodiacSign::Gemini => "मिथुन",
            ZodiacSign::Cancer => "कर्क",
            ZodiacSign::Leo => "सिंह",
            ZodiacSign::Virgo => "कन्या",
            ZodiacSign::Libra => "तुला",
            ZodiacSign::Scorpio => "वृश्चिक",
            ZodiacSign::Sagittarius => "धनु",
            ZodiacSign::Capricorn => "मकर",
            ZodiacSign::Aquarius => "कुंभ",
            ZodiacSign::Pisces => "मीन",
        }
    }

    pub fn element(&self) -> Element {
        match self {
            ZodiacSign::Aries | ZodiacSign::Leo | ZodiacSign::Sagittarius => Element::Fire,
            ZodiacSign::Taurus | ZodiacSign::Virgo | ZodiacSign::Capricorn => Element::Earth,
            ZodiacSign::Gemini | ZodiacSign::Libra | ZodiacSign::Aquarius => Element::Air,
            ZodiacSign::Cancer | ZodiacSign::Scorpio | ZodiacSign::Pisces => Element::Water,
        }
    }

    /// Colour offered when the model does not supply one.
    pub fn lucky_color(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Red",
            ZodiacSign::Taurus => "Green",
            ZodiacSign::Gemini => "Yellow",
            ZodiacSign::Cancer => "Silver",
            ZodiacSign::Leo => "Gold",
            ZodiacSign::Virgo => "Navy Blue",
            ZodiacSign::Libra => "Pink",
            ZodiacSign::Scorpio => "Maroon",
            ZodiacSign::Sagittarius => "Purple",
            ZodiacSign::Capricorn => "Brown",
            ZodiacSign::Aquarius => "Turquoise",
            ZodiacSign::Pisces => "Sea Green",
        }
    }

    /// Number offered when the model does not supply one.
    pub fn lucky_number(&self) -> u8 {
        match self {
            ZodiacSign::Aries => 9,
            ZodiacSign::Taurus => 6,
            ZodiacSign::Gemini => 5,
            ZodiacSign::Cancer => 2,
            ZodiacSign::Leo => 1,
            ZodiacSign::Virgo => 5,
            ZodiacSign::Libra => 6,
            ZodiacSign::Scorpio => 9,
            ZodiacSign::Sagittarius => 3,
            ZodiacSign::Capricorn => 8,
            ZodiacSign::Aquarius => 4,
            ZodiacSign::Pisces => 7,
        }
    }
}

/// Classical element of a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

/// Vedic moon sign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Rashi {
    Mesh,
    Vrishabh,
    Mithun,
    Kark,
    Simha,
    Kanya,
    Tula,
    Vrishchik,
    Dhanu,
    Makar,
    Kumbh,
    Meen,
}

impl Rashi {
    pub fn id(&self) -> &str {
        self.as_ref()
    }

    /// The western sign occupying the same twelfth of the zodiac.
    pub fn western(&self) -> ZodiacSign {
        match self {
            Rashi::Mesh => ZodiacSign::Aries,
            Rashi::Vrishabh => ZodiacSign::Taurus,
            Rashi::Mithun => ZodiacSign::Gemini,
            Rashi::Kark => ZodiacSign::Cancer,
            Rashi::Simha => ZodiacSign::Leo,
            Rashi::Kanya => ZodiacSign::Virgo,
            Rashi::Tula => ZodiacSign::Libra,
            Rashi::Vrishchik => ZodiacSign::Scorpio,
            Rashi::Dhanu => ZodiacSign::Sagittarius,
            Rashi::Makar => ZodiacSign::Capricorn,
            Rashi::Kumbh => ZodiacSign::Aquarius,
            Rashi::Meen => ZodiacSign::Pisces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_aries_pisces_cusp() {
        assert_eq!(ZodiacSign::from_date(date(1990, 3, 21)), ZodiacSign::Aries);
        assert_eq!(ZodiacSign::from_date(date(1990, 3, 20)), ZodiacSign::Pisces);
    }

    #[test]
    fn test_every_cusp() {
        let cusps = [
            ((1, 19), ZodiacSign::Capricorn, (1, 20), ZodiacSign::Aquarius),
            ((2, 18), ZodiacSign::Aquarius, (2, 19), ZodiacSign::Pisces),
            ((4, 19), ZodiacSign::Aries, (4, 20), ZodiacSign::Taurus),
            ((5, 20), ZodiacSign::Taurus, (5, 21), ZodiacSign::Gemini),
            ((6, 20), ZodiacSign::Gemini, (6, 21), ZodiacSign::Cancer),
            ((7, 22), ZodiacSign::Cancer, (7, 23), ZodiacSign::Leo),
            ((8, 22), ZodiacSign::Leo, (8, 23), ZodiacSign::Virgo),
            ((9, 22), ZodiacSign::Virgo, (9, 23), ZodiacSign::Libra),
            ((10, 22), ZodiacSign::Libra, (10, 23), ZodiacSign::Scorpio),
            ((11, 21), ZodiacSign::Scorpio, (11, 22), ZodiacSign::Sagittarius),
            ((12, 21), ZodiacSign::Sagittarius, (12, 22), ZodiacSign::Capricorn),
        ];
        for ((m1, d1), before, (m2, d2), after) in cusps {
            assert_eq!(ZodiacSign::from_date(date(2001, m1, d1)), before);
            assert_eq!(ZodiacSign::from_date(date(2001, m2, d2)), after);
        }
    }

    #[test]
    fn test_leap_day_is_pisces() {
        assert_eq!(ZodiacSign::from_date(date(2000, 2, 29)), ZodiacSign::Pisces);
    }

    #[test]
    fn test_ids_and_rashi_mapping() {
        assert_eq!(ZodiacSign::Cancer.id(), "cancer");
        assert_eq!("Kark".parse::<Rashi>().unwrap().western(), ZodiacSign::Cancer);

        let westerns: Vec<ZodiacSign> = Rashi::iter().map(|r| r.western()).collect();
        let all: Vec<ZodiacSign> = ZodiacSign::iter().collect();
        assert_eq!(westerns, all);
    }
}
