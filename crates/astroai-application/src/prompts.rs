//! Prompt templates for the reading features.
//!
//! Templates are Jinja2 (rendered with `minijinja`). Every system prompt
//! shares the same guidance rules and ends with an instruction to answer in
//! the user's language.

use astroai_core::error::{AstroError, Result};
use astroai_core::language::Language;
use astroai_core::reading::{Hand, TarotSpread};
use astroai_core::user::ZodiacSign;
use minijinja::{Environment, context};

const RULES: &str = r#"You are AstroAI, a warm and wise spiritual guide.

RULES YOU MUST FOLLOW:
1. NEVER predict death, serious illness, legal verdicts or guaranteed future events.
2. NEVER give medical, legal or financial advice.
3. NEVER use fear-based language.
4. ALWAYS keep answers positive, empowering and open-ended.
5. Use symbolic and reflective language."#;

const PALM_SYSTEM: &str = r#"{{ rules }}

You are reading a palm photograph. This is the user's {{ hand }} hand.
Give long, detailed interpretations for each line, with advice for each.

Format your response as JSON:
{
  "summary": "Brief overall reading",
  "heartLine": { "type": "description", "meaning": "detailed meaning", "advice": "guidance" },
  "headLine": { "type": "description", "meaning": "detailed meaning", "advice": "guidance" },
  "lifeLine": { "type": "description", "meaning": "detailed meaning", "advice": "guidance" },
  "fateLine": { "type": "description", "meaning": "detailed meaning", "advice": "guidance" },
  "overallAdvice": "Final spiritual guidance"
}

Please respond in {{ language }}."#;

const PALM_USER: &str =
    "Please analyze this {{ hand }} hand palm image and provide a detailed spiritual reading.";

const TAROT_SYSTEM: &str = r#"{{ rules }}

You are a compassionate tarot reader. Frame challenges as growth
opportunities and connect the cards into one story.

Format your response as JSON:
{
  "reading": "Detailed reading connecting all three cards",
  "affirmation": "Positive affirmation for the day"
}

Please respond in {{ language }}."#;

const TAROT_USER: &str = r#"I drew these {{ cards | length }} tarot cards for a "{{ category }}" reading:

{% for drawn in cards -%}
Card {{ loop.index }} ({{ drawn.position }}): {{ drawn.name }} - {{ drawn.upright }}
{% endfor %}
Please provide a detailed, spiritual, and encouraging reading connecting all three cards for my {{ category }} question. Include an affirmation."#;

const HOROSCOPE_SYSTEM: &str = r#"{{ rules }}

You are a gentle astrologer giving daily horoscopes. Include mood, lucky
color, lucky number and lucky time, and cover love, career and health.

Format your response as JSON:
{
  "sign": "Zodiac sign name",
  "date": "Today's date",
  "mood": "Overall mood word",
  "luckyColor": "Color name",
  "luckyNumber": "Number",
  "luckyTime": "Time range",
  "overall": "2-3 sentence overview",
  "love": "Love guidance",
  "career": "Career guidance",
  "health": "Wellness tip (NOT medical advice)",
  "advice": "Daily wisdom"
}

Please respond in {{ language }}."#;

const HOROSCOPE_USER: &str = r#"Give me a detailed daily horoscope for {{ sign }} ({{ symbol }}) for today {{ date }}.

Sign element: {{ element }}
{% if name %}The reader's name is {{ name }}.{% endif %}

Please provide the response in JSON format as specified."#;

const CHAT_SYSTEM: &str = r#"{{ rules }}

Users come to you with questions about life, love, career and spirituality.
If asked about health, suggest a healthcare professional; if asked about
legal matters, suggest a legal professional. Always end with an empowering
message.

User's name: {{ name }}
User's zodiac: {{ zodiac }}

Please respond in {{ language }}."#;

/// Compiled prompt templates.
#[derive(Debug)]
pub struct Prompts {
    env: Environment<'static>,
}

impl Prompts {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("palm_system", PALM_SYSTEM),
            ("palm_user", PALM_USER),
            ("tarot_system", TAROT_SYSTEM),
            ("tarot_user", TAROT_USER),
            ("horoscope_system", HOROSCOPE_SYSTEM),
            ("horoscope_user", HOROSCOPE_USER),
            ("chat_system", CHAT_SYSTEM),
        ] {
            env.add_template(name, source)
                .map_err(|e| AstroError::internal(format!("Invalid prompt template {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(|e| AstroError::internal(format!("Failed to render prompt {name}: {e}")))
    }

    /// System and user text for a palm reading.
    pub fn palm(&self, hand: Hand, language: Language) -> Result<(String, String)> {
        let ctx = context! {
            rules => RULES,
            hand => hand.to_string(),
            language => language.english_name(),
        };
        Ok((
            self.render("palm_system", ctx.clone())?,
            self.render("palm_user", ctx)?,
        ))
    }

    pub fn tarot(&self, spread: &TarotSpread, language: Language) -> Result<(String, String)> {
        let cards: Vec<minijinja::Value> = spread
            .cards
            .iter()
            .map(|drawn| {
                context! {
                    position => drawn.position.to_string(),
                    name => drawn.card.name.as_str(),
                    upright => drawn.card.meaning.upright.as_str(),
                }
            })
            .collect();
        let ctx = context! {
            rules => RULES,
            category => spread.category.to_string(),
            cards => cards,
            language => language.english_name(),
        };
        Ok((
            self.render("tarot_system", ctx.clone())?,
            self.render("tarot_user", ctx)?,
        ))
    }

    pub fn horoscope(
        &self,
        sign: ZodiacSign,
        date: &str,
        name: Option<&str>,
        language: Language,
    ) -> Result<(String, String)> {
        let ctx = context! {
            rules => RULES,
            sign => sign.name(),
            symbol => sign.symbol(),
            element => sign.element().to_string(),
            date => date,
            name => name.filter(|n| !n.trim().is_empty()),
            language => language.english_name(),
        };
        Ok((
            self.render("horoscope_system", ctx.clone())?,
            self.render("horoscope_user", ctx)?,
        ))
    }

    /// System prompt for the chat; the conversation itself is sent as
    /// message history.
    pub fn chat(&self, name: &str, zodiac: Option<ZodiacSign>, language: Language) -> Result<String> {
        let name = if name.trim().is_empty() { "Stargazer" } else { name.trim() };
        self.render(
            "chat_system",
            context! {
                rules => RULES,
                name => name,
                zodiac => zodiac.map(|z| z.name()).unwrap_or("Unknown"),
                language => language.english_name(),
            },
        )
    }
}
