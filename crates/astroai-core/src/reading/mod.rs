//! Reading records and the normalizer that builds them from model output.

pub mod chat;
pub mod horoscope;
pub mod normalizer;
pub mod palm;
pub mod tarot;

pub use chat::{CONNECTION_DISRUPTED_REPLY, ChatMessage, ChatRole};
pub use horoscope::{Horoscope, HoroscopeContext};
pub use normalizer::{Normalize, Normalized, extract_json_object, normalize};
pub use palm::{Hand, PalmLine, PalmReading};
pub use tarot::{
    CardMeaning, DrawnCard, SpreadPosition, TarotCard, TarotCategory, TarotInterpretation,
    TarotReading, TarotSpread,
};
