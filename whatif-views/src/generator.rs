use whatif_api::{ApiError, CustomStoryRequest, StoryApi, StoryRequest};
use whatif_common::models::{Length, Story, ValidationError};

use crate::{
    rating::{self, RatingControl, Submission},
    Action, Liveness, Notice,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UniverseChoice {
    Preset(String),
    /// A user defined universe. Without a system prompt one is requested from
    /// the service before the story itself.
    Custom {
        name: String,
        system_prompt: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorForm {
    pub universe: UniverseChoice,
    pub what_if: String,
    pub length: Length,
}

/// A validated form, ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationPlan {
    Preset(StoryRequest),
    Custom {
        universe: String,
        system_prompt: Option<String>,
        what_if: String,
        length: Length,
    },
}

impl GeneratorForm {
    pub fn validate(&self) -> Result<GenerationPlan, ValidationError> {
        let what_if = self.what_if.trim();

        if what_if.is_empty() {
            return Err(ValidationError::EmptyPremise);
        }

        match &self.universe {
            UniverseChoice::Preset(universe) => {
                if universe.trim().is_empty() {
                    return Err(ValidationError::NoUniverse);
                }

                Ok(GenerationPlan::Preset(StoryRequest {
                    universe: universe.clone(),
                    what_if: what_if.to_string(),
                    length: self.length,
                }))
            }
            UniverseChoice::Custom {
                name,
                system_prompt,
            } => {
                let name = name.trim();

                if name.is_empty() {
                    return Err(ValidationError::EmptyUniverseName);
                }

                Ok(GenerationPlan::Custom {
                    universe: name.to_string(),
                    system_prompt: system_prompt
                        .as_deref()
                        .map(str::trim)
                        .filter(|prompt| !prompt.is_empty())
                        .map(str::to_string),
                    what_if: what_if.to_string(),
                    length: self.length,
                })
            }
        }
    }
}

pub struct Generator<A> {
    api: A,
    liveness: Liveness,
    universes: Vec<String>,
    story: Option<Story>,
    loading: bool,
    rating: RatingControl,
    notice: Option<Notice>,
}

impl<A> Generator<A>
where
    A: StoryApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            liveness: Liveness::default(),
            universes: Vec::new(),
            story: None,
            loading: false,
            rating: RatingControl::default(),
            notice: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn universes(&self) -> &[String] {
        &self.universes
    }

    /// The universe preselected in the form.
    pub fn default_universe(&self) -> Option<&str> {
        self.universes.first().map(String::as_str)
    }

    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
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

    fn raise(&mut self, notice: Notice) -> Notice {
        self.notice = Some(notice.clone());

        notice
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn load_universes(&mut self) -> Result<(), Notice> {
        let res = self.api.universes().await;

        if !self.liveness.is_alive() {
            return Ok(());
        }

        match res {
            Ok(universes) => {
                self.universes = universes;

                Ok(())
            }
            Err(err) => Err(self.raise(Notice::from_api(Action::LoadUniverses, &err))),
        }
    }

    #[tracing::instrument(skip(self, form), fields(length = %form.length), err)]
    pub async fn generate(&mut self, form: &GeneratorForm) -> Result<(), Notice> {
        if self.loading {
            tracing::debug!("generation already in flight");

            return Ok(());
        }

        let plan = match form.validate() {
            Ok(plan) => plan,
            Err(err) => return Err(self.raise(err.into())),
        };

        self.loading = true;
        self.notice = None;
        self.story = None;

        let res = self.run(plan).await;

        if !self.liveness.is_alive() {
            tracing::debug!("generator closed, dropping story");

            return Ok(());
        }

        self.loading = false;

        match res {
            Ok(Some(story)) => {
                tracing::info!(story_id = %story.id, words = story.word_count, "story generated");

                self.rating.reset();
                self.story = Some(story);

                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                tracing::error!(error = ?err, "generation failed");

                Err(self.raise(Notice::Failed(Action::Generate)))
            }
        }
    }

    async fn run(&self, plan: GenerationPlan) -> Result<Option<Story>, ApiError> {
        match plan {
            GenerationPlan::Preset(request) => self.api.generate_story(&request).await.map(Some),
            GenerationPlan::Custom {
                universe,
                system_prompt,
                what_if,
                length,
            } => {
                let system_prompt = match system_prompt {
                    Some(prompt) => prompt,
                    None => {
                        tracing::debug!(universe = %universe, "requesting system prompt");

                        let prompt = self.api.system_prompt(&universe).await?;

                        if !self.liveness.is_alive() {
                            return Ok(None);
                        }

                        prompt
                    }
                };

                let request = CustomStoryRequest {
                    universe,
                    system_prompt,
                    what_if,
                    length,
                };

                self.api.generate_custom_story(&request).await.map(Some)
            }
        }
    }

    /// Rates the story that was just generated.
    #[tracing::instrument(skip(self), err)]
    pub async fn rate(&mut self, value: u8) -> Result<(), Notice> {
        let story_id = match &self.story {
            Some(story) => story.id,
            None => return Err(self.raise(ValidationError::NothingSelected.into())),
        };

        match rating::submit(&self.api, &mut self.rating, &self.liveness, story_id, value).await
        {
            Ok(Submission::Saved(summary)) => {
                if let Some(story) = self.story.as_mut() {
                    story.rating = summary;
                }

                Ok(())
            }
            Ok(_) => Ok(()),
            Err(notice) => Err(self.raise(notice)),
        }
    }
}
