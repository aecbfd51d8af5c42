//! Tag encoding of the profile metadata stored in the API's `intro` field.
//!
//! The backend only has one free-text `intro` column, so five fields are
//! packed into it as
//! `#intro:<intro> #pet:<pet> #gender:<gender> #birthdate:<birthdate> #location:<location>`.
//! Other clients read and write the same string, so the layout is fixed and
//! values are never escaped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Segment keys in the order they are written.
pub const TAG_KEYS: [&str; 5] = ["intro", "pet", "gender", "birthdate", "location"];

/// `#key:` at the start of the string or right after whitespace.
static TAG_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)#([A-Za-z_][A-Za-z0-9_]*):").expect("tag marker regex should compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Only the two labels offered by the edit form are recognised.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "남아" => Some(Self::Male),
            "여아" => Some(Self::Female),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "남아",
            Self::Female => "여아",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Male => "♂",
            Self::Female => "♀",
        }
    }
}

/// Decoded form of the `intro` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroFields {
    pub intro: String,
    pub pet: Option<String>,
    /// Raw label; see [`Gender::from_label`].
    pub gender: Option<String>,
    /// `YYYY-MM-DD`
    pub birthdate: Option<String>,
    pub location: Option<String>,
    /// Segments with keys this client does not know, in input order.
    /// Kept for inspection only; `encode` never writes them back.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,
}

impl IntroFields {
    /// Packs the five fields in fixed key order. Absent fields still get
    /// their (empty) segment.
    pub fn encode(&self) -> String {
        format!(
            "#intro:{} #pet:{} #gender:{} #birthdate:{} #location:{}",
            self.intro,
            self.pet.as_deref().unwrap_or_default(),
            self.gender.as_deref().unwrap_or_default(),
            self.birthdate.as_deref().unwrap_or_default(),
            self.location.as_deref().unwrap_or_default(),
        )
    }

    /// Parses an encoded intro. Never fails: anything that does not look like
    /// a segment is dropped and the field stays absent.
    ///
    /// A segment starts at `#key:` placed at the start of the string or after
    /// whitespace, and its value runs up to the next such marker. Values are
    /// trimmed; empty values count as absent. The key is split off once, so
    /// colons inside a value are kept. If a key repeats, its first non-empty
    /// value wins.
    pub fn decode(raw: Option<&str>) -> Self {
        let mut fields = Self::default();
        let Some(raw) = raw else {
            return fields;
        };

        let markers: Vec<(usize, usize, &str)> = TAG_MARKER
            .captures_iter(raw)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let key = caps.get(1)?;
                Some((whole.start(), whole.end(), key.as_str()))
            })
            .collect();

        for (i, &(_, value_start, key)) in markers.iter().enumerate() {
            let value_end = markers
                .get(i + 1)
                .map_or(raw.len(), |&(next_start, _, _)| next_start);
            fields.set(key, raw[value_start..value_end].trim());
        }

        fields
    }

    /// Whether `raw` holds at least one segment marker.
    pub fn is_tagged(raw: &str) -> bool {
        TAG_MARKER.is_match(raw)
    }

    fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let slot = match key {
            "intro" => {
                if self.intro.is_empty() {
                    self.intro = value.to_string();
                }
                return;
            }
            "pet" => &mut self.pet,
            "gender" => &mut self.gender,
            "birthdate" => &mut self.birthdate,
            "location" => &mut self.location,
            _ => {
                if !self.extra.iter().any(|(k, _)| k == key) {
                    self.extra.push((key.to_string(), value.to_string()));
                }
                return;
            }
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    /// Present fields as `(key, value)` in encoding order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let values = [
            Some(self.intro.as_str()).filter(|s| !s.is_empty()),
            self.pet.as_deref(),
            self.gender.as_deref(),
            self.birthdate.as_deref(),
            self.location.as_deref(),
        ];
        TAG_KEYS
            .iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|v| (*key, v)))
            .collect()
    }

    /// Reports the first value that other readers of the format could split
    /// differently: `#` or `:` anywhere, or surrounding whitespace that
    /// decoding trims away.
    pub fn check_lossless(&self) -> Result<(), ProfileError> {
        for (field, value) in self.entries() {
            if value.contains('#') || value.contains(':') || value.trim() != value {
                return Err(ProfileError::Decode {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IntroFields {
        IntroFields {
            intro: "hi".into(),
            pet: Some("dog".into()),
            gender: Some("남아".into()),
            birthdate: Some("2024-01-01".into()),
            location: Some("Seoul".into()),
            extra: vec![],
        }
    }

    #[test]
    fn encode_matches_wire_format() {
        assert_eq!(
            sample().encode(),
            "#intro:hi #pet:dog #gender:남아 #birthdate:2024-01-01 #location:Seoul"
        );
    }

    #[test]
    fn encode_keeps_empty_segments() {
        let fields = IntroFields {
            intro: "hello".into(),
            ..Default::default()
        };
        assert_eq!(
            fields.encode(),
            "#intro:hello #pet: #gender: #birthdate: #location:"
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let fields = sample();
        assert_eq!(IntroFields::decode(Some(&fields.encode())), fields);
    }

    #[test]
    fn decode_empty_input() {
        assert_eq!(IntroFields::decode(None), IntroFields::default());
        assert_eq!(IntroFields::decode(Some("")), IntroFields::default());
    }

    #[test]
    fn decode_treats_empty_segments_as_absent() {
        let fields = IntroFields::decode(Some("#intro: #pet: #gender:여아 #birthdate: #location:"));
        assert_eq!(fields.intro, "");
        assert_eq!(fields.pet, None);
        assert_eq!(fields.gender.as_deref(), Some("여아"));
        assert_eq!(fields.birthdate, None);
    }

    #[test]
    fn decode_tolerates_missing_and_unknown_segments() {
        let fields = IntroFields::decode(Some("#pet:cat #mood:sleepy #location:Busan"));
        assert_eq!(fields.intro, "");
        assert_eq!(fields.pet.as_deref(), Some("cat"));
        assert_eq!(fields.location.as_deref(), Some("Busan"));
        assert_eq!(fields.extra, vec![("mood".to_string(), "sleepy".to_string())]);
    }

    #[test]
    fn decode_plain_text_intro_yields_nothing() {
        let fields = IntroFields::decode(Some("just a regular bio"));
        assert_eq!(fields, IntroFields::default());
    }

    #[test]
    fn decode_keeps_colons_and_inline_hashes() {
        let fields = IntroFields::decode(Some("#intro:time: 3pm#walk #pet:dog"));
        assert_eq!(fields.intro, "time: 3pm#walk");
        assert_eq!(fields.pet.as_deref(), Some("dog"));
    }

    #[test]
    fn decode_trims_values_and_leading_space() {
        let fields = IntroFields::decode(Some("  #intro:  hi there   #pet:  dog "));
        assert_eq!(fields.intro, "hi there");
        assert_eq!(fields.pet.as_deref(), Some("dog"));
    }

    #[test]
    fn decode_first_value_wins_on_repeat() {
        let fields = IntroFields::decode(Some("#pet:dog #pet:cat"));
        assert_eq!(fields.pet.as_deref(), Some("dog"));
    }

    #[test]
    fn gender_labels_map_to_glyphs() {
        assert_eq!(Gender::from_label("남아").map(Gender::glyph), Some("♂"));
        assert_eq!(Gender::from_label("여아").map(Gender::glyph), Some("♀"));
        assert_eq!(Gender::from_label("other"), None);
        assert_eq!(Gender::Female.label(), "여아");
    }

    #[test]
    fn check_lossless_flags_separator_characters() {
        assert!(sample().check_lossless().is_ok());

        let mut fields = sample();
        fields.location = Some("Seoul #pet:cat".into());
        match fields.check_lossless() {
            Err(ProfileError::Decode { field, .. }) => assert_eq!(field, "location"),
            other => panic!("expected decode error, got {other:?}"),
        }

        fields.location = Some("Seoul".into());
        fields.intro = "ratio 1:2".into();
        assert!(fields.check_lossless().is_err());
    }

    #[test]
    fn entries_skip_absent_fields() {
        let fields = IntroFields {
            pet: Some("dog".into()),
            location: Some("Seoul".into()),
            ..Default::default()
        };
        assert_eq!(fields.entries(), vec![("pet", "dog"), ("location", "Seoul")]);
    }
}
