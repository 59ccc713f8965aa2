use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for StoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A generated story as the service returns it.
///
/// List payloads leave `story` out; the detail payload carries the full text.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Story {
    pub id: StoryId,
    pub universe: String,
    pub what_if: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    pub word_count: u32,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

impl Story {
    /// Non-empty paragraphs of the story text, if the text was loaded.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.story
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }
}

/// Aggregate rating of a story.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub rating_count: u32,
}

impl RatingSummary {
    pub fn new(average_rating: f64, rating_count: u32) -> Self {
        let average_rating = if average_rating.is_finite() {
            average_rating.clamp(0.0, 5.0)
        } else {
            0.0
        };

        Self {
            average_rating,
            rating_count,
        }
    }

    /// Builds an aggregate out of the single scalar rating older payloads use.
    pub fn from_scalar(rating: f64) -> Self {
        let summary = Self::new(rating, 0);

        Self {
            rating_count: u32::from(summary.average_rating > 0.0),
            ..summary
        }
    }

    /// Average to display, zero while nobody has rated.
    pub fn average(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.average_rating
        }
    }

    pub fn is_rated(&self) -> bool {
        self.average() > 0.0
    }
}

/// A single user's rating, always within 1..=5.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Length {
    #[serde(rename = "short")]
    Short,
    #[default]
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "long")]
    Long,
}

serde_plain::derive_display_from_serialize!(Length);
serde_plain::derive_fromstr_from_deserialize!(Length);

impl Length {
    pub const ALL: [Length; 3] = [Length::Short, Length::Medium, Length::Long];
}

/// Opaque token granting public read access to one story.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareToken(String);

impl ShareToken {
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        let token = token.trim();

        let well_formed = !token.is_empty()
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if well_formed {
            Ok(Self(token.to_string()))
        } else {
            Err(ValidationError::MalformedShareToken)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShareToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShareToken> for String {
    fn from(token: ShareToken) -> Self {
        token.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creation time of a story, ordered chronologically.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub NaiveDateTime);

impl Timestamp {
    const WIRE_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(datetime.naive_utc()));
        }

        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, Self::WIRE_FORMAT) {
            return Ok(Self(datetime));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Self)
            .ok_or_else(|| TimestampError(s.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self.0.format(Self::WIRE_FORMAT))
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognised timestamp `{0}`")]
pub struct TimestampError(String);

/// Input rejected before any request is made.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a \"What If\" scenario")]
    EmptyPremise,
    #[error("Please choose a universe")]
    NoUniverse,
    #[error("Please enter a name for your universe")]
    EmptyUniverseName,
    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
    #[error("Select a story first")]
    NothingSelected,
    #[error("Share link is malformed")]
    MalformedShareToken,
}
