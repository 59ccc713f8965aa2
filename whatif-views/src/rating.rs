//! The five star rating control.
//!
//! The control knows nothing about how a rating is stored: it validates the
//! pick, remembers it for display and refuses a second pick while the first
//! one is still being submitted.

use whatif_api::StoryApi;
use whatif_common::models::{Rating, RatingSummary, StoryId, ValidationError};

use crate::{Action, Liveness, Notice};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    Submit(Rating),
    Busy,
}

#[derive(Clone, Debug, Default)]
pub struct RatingControl {
    in_flight: bool,
    picked: Option<Rating>,
    previous: Option<Rating>,
}

impl RatingControl {
    pub fn pick(&mut self, value: u8) -> Result<Pick, ValidationError> {
        let rating = Rating::new(value)?;

        if self.in_flight {
            return Ok(Pick::Busy);
        }

        self.in_flight = true;
        self.previous = self.picked.replace(rating);

        Ok(Pick::Submit(rating))
    }

    /// Ends the submission, rolling the shown pick back if it was not saved.
    pub fn settle(&mut self, saved: bool) {
        self.in_flight = false;

        if !saved {
            self.picked = self.previous;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// What this user picked, shown as "You rated: N stars".
    pub fn picked(&self) -> Option<Rating> {
        self.picked
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Submission {
    Saved(RatingSummary),
    Busy,
    Abandoned,
}

pub(crate) async fn submit<A>(
    api: &A,
    control: &mut RatingControl,
    liveness: &Liveness,
    story_id: StoryId,
    value: u8,
) -> Result<Submission, Notice>
where
    A: StoryApi,
{
    let rating = match control.pick(value)? {
        Pick::Submit(rating) => rating,
        Pick::Busy => {
            tracing::debug!(story_id = %story_id, "rating already in flight");

            return Ok(Submission::Busy);
        }
    };

    let res = api.rate_story(story_id, rating).await;

    if !liveness.is_alive() {
        return Ok(Submission::Abandoned);
    }

    control.settle(res.is_ok());

    match res {
        Ok(summary) => {
            tracing::info!(story_id = %story_id, rating = %rating, "rating saved");

            Ok(Submission::Saved(summary))
        }
        Err(err) => Err(Notice::from_api(Action::Rate, &err)),
    }
}

/// Display strings for an aggregate rating.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatingDisplay {
    pub average: String,
    pub count: String,
    pub stars: String,
}

impl RatingDisplay {
    pub fn new(summary: &RatingSummary) -> Self {
        let average = summary.average();

        Self {
            average: format!("{:.1}", average),
            count: format!(
                "{} {}",
                summary.rating_count,
                if summary.rating_count == 1 {
                    "rating"
                } else {
                    "ratings"
                }
            ),
            stars: stars(average.round() as usize),
        }
    }
}

pub fn stars(filled: usize) -> String {
    let filled = filled.min(usize::from(Rating::MAX));

    "★".repeat(filled) + &"☆".repeat(usize::from(Rating::MAX) - filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_picks_are_rejected() {
        let mut control = RatingControl::default();

        assert_eq!(control.pick(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(control.pick(6), Err(ValidationError::RatingOutOfRange(6)));
        assert!(!control.is_in_flight());
    }

    #[test]
    fn second_pick_is_refused_while_in_flight() {
        let mut control = RatingControl::default();

        assert!(matches!(control.pick(4), Ok(Pick::Submit(_))));
        assert_eq!(control.pick(2), Ok(Pick::Busy));
        assert_eq!(control.picked().map(Rating::get), Some(4));

        control.settle(true);

        assert!(matches!(control.pick(2), Ok(Pick::Submit(_))));
    }

    #[test]
    fn failed_submission_restores_the_previous_pick() {
        let mut control = RatingControl::default();

        control.pick(3).unwrap();
        control.settle(true);
        control.pick(5).unwrap();
        control.settle(false);

        assert_eq!(control.picked().map(Rating::get), Some(3));
        assert!(!control.is_in_flight());
    }

    #[test]
    fn unrated_display_is_zero() {
        let display = RatingDisplay::new(&RatingSummary::new(0.0, 0));

        assert_eq!(display.average, "0.0");
        assert_eq!(display.count, "0 ratings");
        assert_eq!(display.stars, "☆☆☆☆☆");
    }

    #[test]
    fn display_rounds_and_pluralises() {
        let display = RatingDisplay::new(&RatingSummary::new(3.6, 1));

        assert_eq!(display.average, "3.6");
        assert_eq!(display.count, "1 rating");
        assert_eq!(display.stars, "★★★★☆");
    }
}
