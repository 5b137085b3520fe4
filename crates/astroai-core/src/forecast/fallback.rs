use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::language::Language;

const ENGLISH: &[&str] = &[
    "The stars align to bring clarity to your thoughts. Trust your intuition today, for it whispers the truth.",
    "A calm energy surrounds you today. Small, patient steps lead to meaningful progress.",
    "Today favours kindness and honest conversation. Open your heart and let others in.",
    "The cosmos invites you to pause and breathe. Rest is part of the journey too.",
    "New ideas are taking shape. Write them down and give them room to grow.",
];

const HINDI: &[&str] = &[
    "आज के सितारे आपके विचारों में स्पष्टता ला रहे हैं। अपनी अंतरात्मा की आवाज़ पर भरोसा रखें।",
    "आज का दिन शुभ रहेगा। धैर्य से उठाया गया हर कदम आपको आगे ले जाएगा।",
    "आज प्रेम और सच्ची बातचीत का दिन है। अपने दिल की बात कहें।",
    "ब्रह्मांड आपको थोड़ा रुककर साँस लेने को कह रहा है। विश्राम भी यात्रा का हिस्सा है।",
    "नए विचार आकार ले रहे हैं। उन्हें लिख लें और बढ़ने का अवसर दें।",
];

const NEPALI: &[&str] = &[
    "आजका ताराहरूले तपाईंको विचारमा स्पष्टता ल्याउँदैछन्। आफ्नो अन्तर्ज्ञानमा विश्वास गर्नुहोस्।",
    "आजको दिन शुभ रहनेछ। धैर्यपूर्वक चालेको हरेक कदमले तपाईंलाई अगाडि बढाउनेछ।",
    "आज माया र इमानदार कुराकानीको दिन हो। आफ्नो मनको कुरा भन्नुहोस्।",
    "ब्रह्माण्डले तपाईंलाई अलिकति रोकिएर सास फेर्न भनिरहेको छ। आराम पनि यात्राकै अंश हो।",
    "नयाँ विचारहरू आकार लिँदैछन्। तिनलाई लेख्नुहोस् र बढ्ने मौका दिनुहोस्।",
];

/// Generic positive messages shown when no live forecast is available,
/// keyed by language.
///
/// Selection depends only on the language and a running day count, so the
/// message is stable through a day and changes the next, month ends
/// included.
#[derive(Debug, Clone)]
pub struct FallbackMessages {
    table: HashMap<Language, Vec<String>>,
}

impl Default for FallbackMessages {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert(Language::En, ENGLISH.iter().map(|s| s.to_string()).collect());
        table.insert(Language::Hi, HINDI.iter().map(|s| s.to_string()).collect());
        table.insert(Language::Ne, NEPALI.iter().map(|s| s.to_string()).collect());
        Self { table }
    }
}

impl FallbackMessages {
    /// Replaces the messages for `lang`. An empty list is ignored.
    pub fn with_messages(mut self, lang: Language, messages: Vec<String>) -> Self {
        if !messages.is_empty() {
            self.table.insert(lang, messages);
        }
        self
    }

    /// Message for `lang` on `date`; languages without their own table use
    /// English.
    pub fn pick(&self, lang: Language, date: NaiveDate) -> &str {
        let messages = self
            .table
            .get(&lang)
            .or_else(|| self.table.get(&Language::En))
            .filter(|m| !m.is_empty());

        match messages {
            Some(messages) => &messages[day_index(date, messages.len())],
            None => ENGLISH[day_index(date, ENGLISH.len())],
        }
    }
}

fn day_index(date: NaiveDate, len: usize) -> usize {
    date.num_days_from_ce().rem_euclid(len as i32) as usize
}
