use std::collections::HashMap;

use whatif_api::StoryApi;
use whatif_common::models::Story;

use crate::{
    archive::{self, SortMode, HISTORY_LIMIT},
    Action, Notice,
};

const PODIUM: usize = 5;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UniverseStats {
    pub universe: String,
    pub stories: usize,
    pub words: u64,
    pub average_rating: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Stats {
    pub total_stories: usize,
    pub total_words: u64,
    pub average_rating: f64,
    pub universes: Vec<UniverseStats>,
    pub top_rated: Vec<Story>,
    pub longest: Vec<Story>,
}

impl Stats {
    pub fn collect(stories: &[Story]) -> Self {
        let mut total = Tally::default();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut tallies: Vec<(&str, Tally)> = Vec::new();

        for story in stories {
            total.add(story);

            let slot = *index.entry(story.universe.as_str()).or_insert_with(|| {
                tallies.push((story.universe.as_str(), Tally::default()));
                tallies.len() - 1
            });

            tallies[slot].1.add(story);
        }

        let mut universes: Vec<UniverseStats> = tallies
            .into_iter()
            .map(|(universe, tally)| UniverseStats {
                universe: universe.to_string(),
                stories: tally.stories,
                words: tally.words,
                average_rating: tally.average(),
            })
            .collect();

        universes.sort_by(|a, b| b.stories.cmp(&a.stories));

        let rated: Vec<Story> = stories
            .iter()
            .filter(|story| story.rating.is_rated())
            .cloned()
            .collect();

        let mut top_rated = archive::sort_stories(&rated, SortMode::Rating);
        top_rated.truncate(PODIUM);

        let mut longest = archive::sort_stories(stories, SortMode::Words);
        longest.truncate(PODIUM);

        Self {
            total_stories: total.stories,
            total_words: total.words,
            average_rating: total.average(),
            universes,
            top_rated,
            longest,
        }
    }
}

/// Running counts for a group of stories.
#[derive(Default)]
struct Tally {
    stories: usize,
    words: u64,
    rated_sum: f64,
    rated: u32,
}

impl Tally {
    fn add(&mut self, story: &Story) {
        self.stories += 1;
        self.words += u64::from(story.word_count);

        if story.rating.is_rated() {
            self.rated_sum += story.rating.average();
            self.rated += 1;
        }
    }

    /// Mean of the rated stories' averages, zero when none are rated.
    fn average(&self) -> f64 {
        if self.rated == 0 {
            0.0
        } else {
            self.rated_sum / f64::from(self.rated)
        }
    }
}

#[tracing::instrument(skip(api), err)]
pub async fn load_stats<A>(api: &A) -> Result<Stats, Notice>
where
    A: StoryApi,
{
    let stories = api
        .history(HISTORY_LIMIT)
        .await
        .map_err(|err| Notice::from_api(Action::LoadHistory, &err))?;

    Ok(Stats::collect(&stories))
}

#[cfg(test)]
mod tests {
    use whatif_common::models::{RatingSummary, StoryId};

    use super::*;

    fn story(id: u64, universe: &str, words: u32, average: f64) -> Story {
        Story {
            id: StoryId(id),
            universe: universe.to_string(),
            what_if: String::from("What if?"),
            story: None,
            word_count: words,
            created_at: "2024-01-01".parse().unwrap(),
            rating: RatingSummary::new(average, u32::from(average > 0.0)),
        }
    }

    #[test]
    fn empty_archive_has_zeroed_stats() {
        let stats = Stats::collect(&[]);

        assert_eq!(stats.total_stories, 0);
        assert_eq!(stats.total_words, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.universes.is_empty());
        assert!(stats.top_rated.is_empty());
    }

    #[test]
    fn averages_ignore_unrated_stories() {
        let stats = Stats::collect(&[
            story(1, "DC", 10, 4.0),
            story(2, "DC", 20, 0.0),
            story(3, "Naruto", 30, 3.0),
        ]);

        assert_eq!(stats.total_words, 60);
        assert_eq!(stats.average_rating, 3.5);
        assert_eq!(stats.top_rated.len(), 2);
    }

    #[test]
    fn universes_are_ranked_by_count() {
        let stats = Stats::collect(&[
            story(1, "Naruto", 10, 0.0),
            story(2, "DC", 20, 5.0),
            story(3, "DC", 30, 3.0),
        ]);

        let dc = &stats.universes[0];

        assert_eq!(dc.universe, "DC");
        assert_eq!(dc.stories, 2);
        assert_eq!(dc.words, 50);
        assert_eq!(dc.average_rating, 4.0);
        assert_eq!(stats.universes[1].average_rating, 0.0);
    }

    #[test]
    fn tied_universes_keep_first_appearance_order() {
        let stats = Stats::collect(&[
            story(1, "Naruto", 10, 2.0),
            story(2, "DC", 20, 0.0),
            story(3, "Naruto", 30, 4.0),
            story(4, "Star Wars", 40, 0.0),
            story(5, "DC", 50, 5.0),
        ]);

        let order: Vec<&str> = stats
            .universes
            .iter()
            .map(|row| row.universe.as_str())
            .collect();

        assert_eq!(order, ["Naruto", "DC", "Star Wars"]);
        assert_eq!(stats.universes[0].average_rating, 3.0);
        assert_eq!(stats.universes[1].words, 70);
    }

    #[test]
    fn podiums_hold_five() {
        let stories: Vec<Story> = (1..=8)
            .map(|id| story(id, "DC", id as u32 * 10, (id % 5) as f64 + 0.5))
            .collect();

        let stats = Stats::collect(&stories);

        assert_eq!(stats.longest.len(), 5);
        assert_eq!(stats.longest[0].id, StoryId(8));
        assert_eq!(stats.top_rated.len(), 5);
        assert_eq!(stats.top_rated[0].rating.average(), 4.5);
    }
}
