//! Page templates and the display values they are filled with.
//!
//! Everything a template prints is formatted here so the templates stay free
//! of logic beyond loops and matches.

use whatif_common::{
    models::{Length, Story, StoryId},
    utils::IntoReadable as _,
};
use whatif_views::{
    archive::{SortMode, UniverseFilter},
    rating::{RatingControl, RatingDisplay},
    share::ShareLink,
    stats::Stats,
};

use crate::theme::Theme;

pub struct Layout {
    pub theme: Theme,
    pub notice: String,
}

impl Layout {
    pub fn new(theme: Theme, notice: Option<String>) -> Self {
        Self {
            theme,
            notice: notice.unwrap_or_default(),
        }
    }
}

/// One `<option>` of a select box.
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    fn new(value: impl ToString, label: impl ToString, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

pub struct StoryCard {
    pub id: StoryId,
    pub universe: String,
    pub what_if: String,
    pub date: String,
    pub created: String,
    pub words: String,
    pub rating: RatingDisplay,
    pub picked: String,
    pub paragraphs: Vec<String>,
}

impl StoryCard {
    pub fn new(story: &Story) -> Self {
        Self {
            id: story.id,
            universe: story.universe.clone(),
            what_if: story.what_if.clone(),
            date: story.created_at.date(),
            created: story.created_at.to_string(),
            words: story.word_count.into_readable().to_string(),
            rating: RatingDisplay::new(&story.rating),
            picked: String::new(),
            paragraphs: story.paragraphs().map(str::to_string).collect(),
        }
    }

    pub fn with_control(mut self, control: &RatingControl) -> Self {
        if let Some(picked) = control.picked() {
            let n = picked.get();

            self.picked = format!("You rated: {} {}", n, if n == 1 { "star" } else { "stars" });
        }

        self
    }
}

/// The five rating buttons, 1 to 5.
pub fn rating_values() -> Vec<u8> {
    (whatif_common::models::Rating::MIN..=whatif_common::models::Rating::MAX).collect()
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniverseMode {
    #[default]
    Preset,
    Custom,
}

/// What the generator form posts.
#[derive(Debug, Default, serde::Deserialize)]
pub struct GenerateForm {
    #[serde(default)]
    pub mode: UniverseMode,
    #[serde(default)]
    pub universe: String,
    #[serde(default)]
    pub custom_name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub what_if: String,
    #[serde(default)]
    pub length: Length,
}

impl GenerateForm {
    pub fn to_form(&self) -> whatif_views::generator::GeneratorForm {
        use whatif_views::generator::{GeneratorForm, UniverseChoice};

        let universe = match self.mode {
            UniverseMode::Preset => UniverseChoice::Preset(self.universe.clone()),
            UniverseMode::Custom => UniverseChoice::Custom {
                name: self.custom_name.clone(),
                system_prompt: Some(self.system_prompt.clone()),
            },
        };

        GeneratorForm {
            universe,
            what_if: self.what_if.clone(),
            length: self.length,
        }
    }
}

#[derive(askama::Template)]
#[template(path = "generator.html")]
pub struct GeneratorPage {
    pub layout: Layout,
    pub universes: Vec<Choice>,
    pub lengths: Vec<Choice>,
    pub custom: bool,
    pub custom_name: String,
    pub system_prompt: String,
    pub what_if: String,
    pub story: Option<StoryCard>,
    pub ratings: Vec<u8>,
}

impl GeneratorPage {
    pub fn new(
        layout: Layout,
        universes: &[String],
        form: &GenerateForm,
        story: Option<StoryCard>,
    ) -> Self {
        let picked = if form.universe.is_empty() {
            universes.first().map(String::as_str).unwrap_or_default()
        } else {
            form.universe.as_str()
        };

        Self {
            layout,
            universes: universes
                .iter()
                .map(|universe| Choice::new(universe, universe, universe == picked))
                .collect(),
            lengths: Length::ALL
                .iter()
                .map(|length| Choice::new(length, length, *length == form.length))
                .collect(),
            custom: matches!(form.mode, UniverseMode::Custom),
            custom_name: form.custom_name.clone(),
            system_prompt: form.system_prompt.clone(),
            what_if: form.what_if.clone(),
            story,
            ratings: rating_values(),
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub universe: Option<String>,
    #[serde(default)]
    pub sort: SortMode,
    #[serde(default)]
    pub story: Option<StoryId>,
}

impl HistoryQuery {
    pub fn filter(&self) -> UniverseFilter {
        match self.universe.as_deref().map(str::trim) {
            None | Some("") => UniverseFilter::All,
            Some(universe) => match universe.parse() {
                Ok(filter) => filter,
                Err(never) => match never {},
            },
        }
    }
}

/// The rating form of the archive and shared pages.
#[derive(Debug, serde::Deserialize)]
pub struct RateForm {
    pub rating: u8,
    #[serde(default)]
    pub universe: Option<String>,
    #[serde(default)]
    pub sort: SortMode,
}

impl RateForm {
    pub fn query(&self) -> HistoryQuery {
        HistoryQuery {
            universe: self.universe.clone(),
            sort: self.sort,
            story: None,
        }
    }
}

#[derive(serde::Serialize)]
struct HistoryQueryPart<'q> {
    universe: &'q str,
    sort: SortMode,
}

pub struct HistoryRow {
    pub card: StoryCard,
    pub href: String,
    pub active: bool,
}

#[derive(askama::Template)]
#[template(path = "history.html")]
pub struct HistoryPage {
    pub layout: Layout,
    pub universes: Vec<Choice>,
    pub sorts: Vec<Choice>,
    pub universe: String,
    pub sort: SortMode,
    pub summary: String,
    pub empty: String,
    pub rows: Vec<HistoryRow>,
    pub selected: Option<StoryCard>,
    pub ratings: Vec<u8>,
}

impl HistoryPage {
    pub fn new(
        layout: Layout,
        options: &[String],
        filter: &UniverseFilter,
        sort: SortMode,
        total: usize,
        visible: &[Story],
        selected: Option<StoryCard>,
    ) -> Result<Self, serde_urlencoded::ser::Error> {
        let universe = filter.to_string();

        let fragment = serde_urlencoded::to_string(&HistoryQueryPart {
            universe: &universe,
            sort,
        })?;

        let selected_id = selected.as_ref().map(|card| card.id);

        let mut universes = vec![Choice::new(
            UniverseFilter::ALL,
            "All universes",
            *filter == UniverseFilter::All,
        )];
        universes.extend(options.iter().map(|option| {
            Choice::new(
                option,
                option,
                matches!(filter, UniverseFilter::Only(only) if only == option),
            )
        }));

        let empty = match (visible.is_empty(), total) {
            (false, _) => "",
            (true, 0) => "No stories yet",
            (true, _) => "No matches found",
        };

        Ok(Self {
            layout,
            universes,
            sorts: SortMode::ALL
                .iter()
                .map(|mode| Choice::new(mode, mode.label(), *mode == sort))
                .collect(),
            summary: format!(
                "{} of {} {}",
                visible.len().into_readable(),
                total.into_readable(),
                if total == 1 { "story" } else { "stories" }
            ),
            empty: empty.to_string(),
            rows: visible
                .iter()
                .map(|story| HistoryRow {
                    href: format!("/history?{}&story={}", fragment, story.id),
                    active: selected_id == Some(story.id),
                    card: StoryCard::new(story),
                })
                .collect(),
            universe,
            sort,
            selected,
            ratings: rating_values(),
        })
    }
}

#[derive(askama::Template)]
#[template(path = "share.html")]
pub struct SharePage {
    pub layout: Layout,
    pub story: StoryCard,
    pub url: String,
}

impl SharePage {
    pub fn new(layout: Layout, story: StoryCard, link: Option<&ShareLink>) -> Self {
        Self {
            layout,
            story,
            url: link.map(|link| link.url.clone()).unwrap_or_default(),
        }
    }
}

#[derive(askama::Template)]
#[template(path = "shared.html")]
pub struct SharedPage {
    pub layout: Layout,
    pub token: String,
    pub story: Option<StoryCard>,
    pub ratings: Vec<u8>,
}

pub struct UniverseRow {
    pub universe: String,
    pub stories: String,
    pub words: String,
    pub average: String,
}

#[derive(askama::Template)]
#[template(path = "stats.html")]
pub struct StatsPage {
    pub layout: Layout,
    pub stories: String,
    pub words: String,
    pub average: String,
    pub universes: Vec<UniverseRow>,
    pub top_rated: Vec<StoryCard>,
    pub longest: Vec<StoryCard>,
}

impl StatsPage {
    pub fn new(layout: Layout, stats: &Stats) -> Self {
        Self {
            layout,
            stories: stats.total_stories.into_readable().to_string(),
            words: stats.total_words.into_readable().to_string(),
            average: format!("{:.1}", stats.average_rating),
            universes: stats
                .universes
                .iter()
                .map(|universe| UniverseRow {
                    universe: universe.universe.clone(),
                    stories: universe.stories.into_readable().to_string(),
                    words: universe.words.into_readable().to_string(),
                    average: format!("{:.1}", universe.average_rating),
                })
                .collect(),
            top_rated: stats.top_rated.iter().map(StoryCard::new).collect(),
            longest: stats.longest.iter().map(StoryCard::new).collect(),
        }
    }
}

/// Stand-alone page for a request that cannot show its usual view.
#[derive(askama::Template)]
#[template(path = "problem.html")]
pub struct ProblemPage {
    pub layout: Layout,
    pub code: u16,
    pub message: String,
}
