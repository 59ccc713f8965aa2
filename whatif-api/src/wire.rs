//! Payload shapes exactly as the service sends them.
//!
//! Older service revisions rate stories with a single scalar `rating`; newer
//! ones keep an aggregate. Both are folded into [`RatingSummary`] by
//! [`rating_summary`], and nothing outside this module sees the difference.

use whatif_common::{
    models::{Rating, RatingSummary, ShareToken, Story, StoryId, Timestamp},
    session::SessionId,
};

#[derive(Debug, serde::Deserialize)]
pub(crate) struct StoryRecord {
    id: StoryId,
    universe: String,
    what_if: String,
    #[serde(default)]
    story: Option<String>,
    #[serde(default)]
    word_count: u32,
    created_at: Timestamp,
    #[serde(flatten)]
    rating: RatingPayload,
}

impl From<StoryRecord> for Story {
    fn from(record: StoryRecord) -> Self {
        Story {
            id: record.id,
            universe: record.universe,
            what_if: record.what_if,
            story: record.story,
            word_count: record.word_count,
            created_at: record.created_at,
            rating: rating_summary(record.rating),
        }
    }
}

/// Every rating field any service revision has been seen to send.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct RatingPayload {
    #[serde(default)]
    average_rating: Option<f64>,
    #[serde(default)]
    rating_count: Option<u32>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    new_rating: Option<f64>,
}

pub(crate) fn rating_summary(payload: RatingPayload) -> RatingSummary {
    let RatingPayload {
        average_rating,
        rating_count,
        rating,
        new_rating,
    } = payload;

    match (average_rating, rating.or(new_rating)) {
        (Some(average), _) => {
            let count = rating_count.unwrap_or_else(|| u32::from(average > 0.0));

            RatingSummary::new(average, count)
        }
        (None, Some(scalar)) => RatingSummary::from_scalar(scalar),
        (None, None) => RatingSummary::new(0.0, rating_count.unwrap_or(0)),
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct UniverseList {
    pub universes: Vec<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct HistoryPage {
    #[serde(default)]
    pub stories: Vec<StoryRecord>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ShareResponse {
    pub token: ShareToken,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct SystemPromptResponse {
    pub system_prompt: String,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct SystemPromptRequest<'r> {
    pub universe: &'r str,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct RateRequest<'r> {
    pub rating: Rating,
    pub session_id: &'r SessionId,
}
