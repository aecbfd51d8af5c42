//! Profile view model: the API's raw profile with its `intro` decoded and
//! the presentation values (age, gender glyph) derived.

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};

use crate::error::ProfileError;
use crate::intro::{Gender, IntroFields};
use crate::model::profile::{ProfileEnvelope, RawProfile};

/// Which envelope the profile arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileShape {
    /// `{"user": ...}`, the signed-in account
    Own,
    /// `{"profile": ...}`, someone else
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileViewModel {
    pub shape: ProfileShape,
    pub id: String,
    pub username: String,
    pub accountname: String,
    pub image: String,

    pub intro: String,
    pub pet: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub location: Option<String>,
    pub extra_tags: Vec<(String, String)>,

    pub follower_count: u64,
    pub following_count: u64,
    pub is_following: bool,

    pub age_label: Option<String>,
    pub gender_glyph: Option<&'static str>,

    /// Raw fields with no typed slot, minus anything the metadata shadows.
    pub extra: Map<String, Value>,
}

/// Builds the view model from a fetched envelope. Decoded metadata wins over
/// raw fields of the same name.
pub fn assemble(envelope: ProfileEnvelope, today: NaiveDate) -> Result<ProfileViewModel, ProfileError> {
    let (shape, raw) = envelope.into_shape()?;
    let RawProfile {
        id,
        username,
        accountname,
        intro,
        image,
        is_follow,
        follower_count,
        following_count,
        mut extra,
        ..
    } = raw;

    let raw_intro = intro.unwrap_or_default();
    let decoded = IntroFields::decode(Some(&raw_intro));

    // An intro written without tags is shown as-is.
    let intro = if IntroFields::is_tagged(&raw_intro) {
        decoded.intro
    } else {
        raw_intro.trim().to_string()
    };

    let mut take = |key: &str, decoded: Option<String>| {
        let raw = extra.remove(key);
        decoded.or_else(|| match raw {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        })
    };
    let pet = take("pet", decoded.pet);
    let gender = take("gender", decoded.gender);
    let birthdate = take("birthdate", decoded.birthdate);
    let location = take("location", decoded.location);

    let age_label = birthdate.as_deref().and_then(|b| age_label(b, today));
    let gender_glyph = gender_glyph(gender.as_deref());

    tracing::debug!(%accountname, ?shape, "assembled profile");

    Ok(ProfileViewModel {
        shape,
        id,
        username,
        accountname,
        image,
        intro,
        pet,
        gender,
        birthdate,
        location,
        extra_tags: decoded.extra,
        follower_count,
        following_count,
        is_following: is_follow,
        age_label,
        gender_glyph,
        extra,
    })
}

/// "<N>개월" from calendar months, ignoring the day of month; "<N>일" when
/// that month count is zero or negative. `None` if the date does not parse.
pub fn age_label(birthdate: &str, today: NaiveDate) -> Option<String> {
    let birth = match NaiveDate::parse_from_str(birthdate.trim(), "%Y-%m-%d") {
        Ok(date) => date,
        Err(e) => {
            tracing::debug!(birthdate, error = %e, "unparseable birthdate");
            return None;
        }
    };

    let months = (today.year() - birth.year()) * 12 - birth.month() as i32 + today.month() as i32;
    if months <= 0 {
        let days = (today - birth).num_days().abs();
        Some(format!("{days}일"))
    } else {
        Some(format!("{months}개월"))
    }
}

pub fn gender_glyph(gender: Option<&str>) -> Option<&'static str> {
    gender.and_then(Gender::from_label).map(Gender::glyph)
}

impl ProfileViewModel {
    pub fn is_own(&self) -> bool {
        self.shape == ProfileShape::Own
    }

    /// The five metadata fields, ready to re-encode.
    pub fn metadata(&self) -> IntroFields {
        IntroFields {
            intro: self.intro.clone(),
            pet: self.pet.clone(),
            gender: self.gender.clone(),
            birthdate: self.birthdate.clone(),
            location: self.location.clone(),
            extra: self.extra_tags.clone(),
        }
    }

    /// Glyph, pet, age and location on one line, absent parts skipped.
    pub fn pet_summary(&self) -> String {
        [
            self.gender_glyph,
            self.pet.as_deref(),
            self.age_label.as_deref(),
            self.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// `("Pet", "dog")` style rows for the present metadata fields.
    pub fn tag_lines(&self) -> Vec<(String, String)> {
        self.metadata()
            .entries()
            .into_iter()
            .map(|(key, value)| (capitalize(key), value.to_string()))
            .collect()
    }

    /// Applies a follow/unfollow response. Only the social counters and the
    /// follow flag change; the decoded metadata stays as it is.
    pub fn apply_follow(&mut self, raw: &RawProfile, following: bool) {
        self.follower_count = raw.follower_count;
        self.following_count = raw.following_count;
        self.is_following = following;
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Row in a follower / following list.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowSummary {
    pub username: String,
    pub accountname: String,
    pub image: String,
    pub intro: String,
    pub is_following: bool,
}

impl From<RawProfile> for FollowSummary {
    fn from(raw: RawProfile) -> Self {
        let intro = match raw.intro.as_deref() {
            Some(text) if IntroFields::is_tagged(text) => IntroFields::decode(Some(text)).intro,
            Some(text) => text.trim().to_string(),
            None => String::new(),
        };
        Self {
            username: raw.username,
            accountname: raw.accountname,
            image: raw.image,
            intro,
            is_following: raw.is_follow,
        }
    }
}
