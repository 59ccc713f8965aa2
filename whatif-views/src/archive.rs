//! The history archive: the bounded list of past stories, filtered and
//! sorted on the client, plus the story currently opened for reading.

use std::{cmp::Ordering, collections::HashSet, fmt, str::FromStr};

use whatif_api::StoryApi;
use whatif_common::models::{RatingSummary, Story, StoryId, ValidationError};

use crate::{
    rating::{self, RatingControl, Submission},
    share::{self, ShareLink},
    Action, Liveness, Notice,
};

/// How many stories the archive asks for.
pub const HISTORY_LIMIT: usize = 1000;

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "oldest")]
    Oldest,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "words")]
    Words,
}

serde_plain::derive_display_from_serialize!(SortMode);
serde_plain::derive_fromstr_from_deserialize!(SortMode);

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::Rating,
        SortMode::Words,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Newest => "Newest",
            SortMode::Oldest => "Oldest",
            SortMode::Rating => "Top Rated",
            SortMode::Words => "Longest",
        }
    }

    fn compare(self, a: &Story, b: &Story) -> Ordering {
        match self {
            SortMode::Newest => b.created_at.cmp(&a.created_at),
            SortMode::Oldest => a.created_at.cmp(&b.created_at),
            SortMode::Rating => b.rating.average().total_cmp(&a.rating.average()),
            SortMode::Words => b.word_count.cmp(&a.word_count),
        }
    }
}

/// Which universe the archive is narrowed to. Matching is exact.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub enum UniverseFilter {
    #[default]
    All,
    Only(String),
}

impl UniverseFilter {
    pub const ALL: &'static str = "all";

    pub fn matches(&self, story: &Story) -> bool {
        match self {
            UniverseFilter::All => true,
            UniverseFilter::Only(universe) => story.universe == *universe,
        }
    }
}

impl FromStr for UniverseFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == Self::ALL {
            UniverseFilter::All
        } else {
            UniverseFilter::Only(s.to_string())
        })
    }
}

impl fmt::Display for UniverseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniverseFilter::All => f.write_str(Self::ALL),
            UniverseFilter::Only(universe) => f.write_str(universe),
        }
    }
}

pub fn filter_by_universe(stories: &[Story], filter: &UniverseFilter) -> Vec<Story> {
    stories
        .iter()
        .filter(|story| filter.matches(story))
        .cloned()
        .collect()
}

/// Returns a sorted copy, equal keys keep their relative order.
pub fn sort_stories(stories: &[Story], mode: SortMode) -> Vec<Story> {
    let mut sorted = stories.to_vec();

    sorted.sort_by(|a, b| mode.compare(a, b));

    sorted
}

/// Distinct universes in order of first appearance.
pub fn universe_options(stories: &[Story]) -> Vec<String> {
    let mut seen = HashSet::new();

    stories
        .iter()
        .filter(|story| seen.insert(story.universe.as_str()))
        .map(|story| story.universe.clone())
        .collect()
}

pub struct Archive<A> {
    api: A,
    liveness: Liveness,
    limit: usize,
    stories: Vec<Story>,
    selected: Option<Story>,
    sort: SortMode,
    filter: UniverseFilter,
    loading: bool,
    rating: RatingControl,
    notice: Option<Notice>,
}

impl<A> Archive<A>
where
    A: StoryApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            liveness: Liveness::default(),
            limit: HISTORY_LIMIT,
            stories: Vec::new(),
            selected: None,
            sort: SortMode::default(),
            filter: UniverseFilter::default(),
            loading: false,
            rating: RatingControl::default(),
            notice: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn selected(&self) -> Option<&Story> {
        self.selected.as_ref()
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn filter(&self) -> &UniverseFilter {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rating_control(&self) -> &RatingControl {
        &self.rating
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    pub fn set_filter(&mut self, filter: UniverseFilter) {
        self.filter = filter;
    }

    /// The list as shown: filtered, then sorted.
    pub fn visible(&self) -> Vec<Story> {
        sort_stories(&filter_by_universe(&self.stories, &self.filter), self.sort)
    }

    pub fn universe_options(&self) -> Vec<String> {
        universe_options(&self.stories)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.rating.reset();
    }

    fn raise(&mut self, notice: Notice) -> Notice {
        self.notice = Some(notice.clone());

        notice
    }

    #[tracing::instrument(skip(self), fields(limit = self.limit), err)]
    pub async fn refresh(&mut self) -> Result<(), Notice> {
        if self.loading {
            return Ok(());
        }

        self.loading = true;
        self.notice = None;

        let res = self.api.history(self.limit).await;

        if !self.liveness.is_alive() {
            tracing::debug!("archive closed, dropping history");

            return Ok(());
        }

        self.loading = false;

        match res {
            Ok(stories) => {
                tracing::info!(count = stories.len(), "loaded history");

                self.stories = stories;

                Ok(())
            }
            Err(err) => Err(self.raise(Notice::from_api(Action::LoadHistory, &err))),
        }
    }

    #[tracing::instrument(skip(self), fields(story_id = %id), err)]
    pub async fn select_story(&mut self, id: StoryId) -> Result<(), Notice> {
        let res = self.api.story(id).await;

        if !self.liveness.is_alive() {
            tracing::debug!("archive closed, dropping story");

            return Ok(());
        }

        match res {
            Ok(story) => {
                self.notice = None;
                self.rating.reset();
                self.selected = Some(story);

                Ok(())
            }
            Err(err) => Err(self.raise(Notice::from_api(Action::LoadStory, &err))),
        }
    }

    /// Rates the opened story and mirrors the new aggregate into the list.
    #[tracing::instrument(skip(self), err)]
    pub async fn submit_rating(&mut self, value: u8) -> Result<(), Notice> {
        let story_id = match &self.selected {
            Some(story) => story.id,
            None => return Err(self.raise(ValidationError::NothingSelected.into())),
        };

        let res = rating::submit(
            &self.api,
            &mut self.rating,
            &self.liveness,
            story_id,
            value,
        )
        .await;

        match res {
            Ok(Submission::Saved(summary)) => {
                self.mirror_rating(story_id, summary);
                self.notice = None;

                Ok(())
            }
            Ok(Submission::Busy) | Ok(Submission::Abandoned) => Ok(()),
            Err(notice) => Err(self.raise(notice)),
        }
    }

    /// Fetches the opened story's aggregate again, for ratings cast elsewhere.
    #[tracing::instrument(skip(self), err)]
    pub async fn reload_rating(&mut self) -> Result<RatingSummary, Notice> {
        let story_id = match &self.selected {
            Some(story) => story.id,
            None => return Err(self.raise(ValidationError::NothingSelected.into())),
        };

        let res = self.api.ratings(story_id).await;

        if !self.liveness.is_alive() {
            tracing::debug!("archive closed, dropping ratings");

            return res.map_err(|err| Notice::from_api(Action::LoadRatings, &err));
        }

        match res {
            Ok(summary) => {
                self.mirror_rating(story_id, summary);

                Ok(summary)
            }
            Err(err) => Err(self.raise(Notice::from_api(Action::LoadRatings, &err))),
        }
    }

    fn mirror_rating(&mut self, story_id: StoryId, summary: RatingSummary) {
        if let Some(selected) = self.selected.as_mut().filter(|s| s.id == story_id) {
            selected.rating = summary;
        }

        for story in self.stories.iter_mut().filter(|s| s.id == story_id) {
            story.rating = summary;
        }
    }

    pub async fn share_selected(&mut self, public_url: &str) -> Result<ShareLink, Notice> {
        let story_id = match &self.selected {
            Some(story) => story.id,
            None => return Err(self.raise(ValidationError::NothingSelected.into())),
        };

        match share::create_share_link(&self.api, public_url, story_id).await {
            Ok(link) => Ok(link),
            Err(notice) => Err(self.raise(notice)),
        }
    }
}
