use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::zodiac::ZodiacSign;
use crate::error::{AstroError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Form input for the profile setup screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub name: String,
    pub dob: Option<NaiveDate>,
    #[serde(default, with = "hh_mm")]
    pub time_of_birth: Option<NaiveTime>,
    pub gender: Option<Gender>,
}

impl ProfileDraft {
    /// Checks the required fields in form order and reports the first miss.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AstroError::validation("name", "Name is required"));
        }
        if self.dob.is_none() {
            return Err(AstroError::validation("dob", "Date of Birth is required"));
        }
        if self.gender.is_none() {
            return Err(AstroError::validation("gender", "Gender is required"));
        }
        Ok(())
    }
}

/// The single local user.
///
/// `zodiac_sign` follows `dob` and cannot be set on its own.
/// `onboarding_complete` only turns true through [`UserProfile::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredProfile", into = "StoredProfile")]
pub struct UserProfile {
    name: String,
    dob: Option<NaiveDate>,
    time_of_birth: Option<NaiveTime>,
    gender: Option<Gender>,
    zodiac_sign: Option<ZodiacSign>,
    onboarding_complete: bool,
}

impl UserProfile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dob(&self) -> Option<NaiveDate> {
        self.dob
    }

    pub fn time_of_birth(&self) -> Option<NaiveTime> {
        self.time_of_birth
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn zodiac_sign(&self) -> Option<ZodiacSign> {
        self.zodiac_sign
    }

    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    /// Validates `draft` and copies it in, completing onboarding.
    pub fn apply(&mut self, draft: ProfileDraft) -> Result<()> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.time_of_birth = draft.time_of_birth;
        self.gender = draft.gender;
        self.set_dob(draft.dob);
        self.onboarding_complete = true;
        Ok(())
    }

    /// The stored values as an editable draft.
    pub fn to_draft(&self) -> ProfileDraft {
        ProfileDraft {
            name: self.name.clone(),
            dob: self.dob,
            time_of_birth: self.time_of_birth,
            gender: self.gender,
        }
    }

    /// Whether `today` is the user's birthday.
    pub fn is_birthday(&self, today: NaiveDate) -> bool {
        self.dob
            .is_some_and(|dob| dob.month() == today.month() && dob.day() == today.day())
    }

    fn set_dob(&mut self, dob: Option<NaiveDate>) {
        self.dob = dob;
        self.zodiac_sign = dob.map(ZodiacSign::from_date);
    }
}

/// Persisted shape. The sign is written for readability but re-derived on
/// load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredProfile {
    name: String,
    dob: Option<NaiveDate>,
    #[serde(with = "hh_mm")]
    time_of_birth: Option<NaiveTime>,
    gender: Option<Gender>,
    zodiac_sign: Option<ZodiacSign>,
    onboarding_complete: bool,
}

impl From<StoredProfile> for UserProfile {
    fn from(stored: StoredProfile) -> Self {
        let mut profile = UserProfile {
            name: stored.name,
            time_of_birth: stored.time_of_birth,
            gender: stored.gender,
            onboarding_complete: stored.onboarding_complete,
            ..Default::default()
        };
        profile.set_dob(stored.dob);
        profile
    }
}

impl From<UserProfile> for StoredProfile {
    fn from(profile: UserProfile) -> Self {
        StoredProfile {
            name: profile.name,
            dob: profile.dob,
            time_of_birth: profile.time_of_birth,
            gender: profile.gender,
            zodiac_sign: profile.zodiac_sign,
            onboarding_complete: profile.onboarding_complete,
        }
    }
}

/// `HH:mm` encoding for an optional time of day.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveTime::parse_from_str(text, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
