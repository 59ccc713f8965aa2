#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use whatif_api::{ApiError, CustomStoryRequest, StoryApi, StoryRequest};
use whatif_common::{
    models::{Rating, RatingSummary, ShareToken, Story, StoryId},
    StatusCode,
};
use whatif_views::Liveness;

/// An in-memory service that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<&'static str>>,
    stories: Mutex<Vec<Story>>,
    failing: Mutex<HashSet<&'static str>>,
    tokens: Mutex<HashMap<String, StoryId>>,
    closes: Mutex<Option<(&'static str, Liveness)>>,
    pub custom_requests: Mutex<Vec<CustomStoryRequest>>,
    pub ratings_sent: Mutex<Vec<(StoryId, u8)>>,
}

impl FakeApi {
    pub fn with_stories(stories: Vec<Story>) -> Self {
        let api = Self::default();
        *api.stories.lock().unwrap() = stories;
        api
    }

    pub fn fail(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    /// Closes `liveness` while `endpoint` is being served.
    pub fn close_during(&self, endpoint: &'static str, liveness: Liveness) {
        *self.closes.lock().unwrap() = Some((endpoint, liveness));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|call| **call == endpoint).count()
    }

    fn enter(&self, endpoint: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(endpoint);

        if let Some((target, liveness)) = &*self.closes.lock().unwrap() {
            if *target == endpoint {
                liveness.close();
            }
        }

        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR));
        }

        Ok(())
    }

    fn find(&self, id: StoryId) -> Option<Story> {
        self.stories
            .lock()
            .unwrap()
            .iter()
            .find(|story| story.id == id)
            .cloned()
    }

    fn created(&self, id: u64, universe: &str, what_if: &str) -> Story {
        let story = Story {
            id: StoryId(id),
            universe: universe.to_string(),
            what_if: what_if.to_string(),
            story: Some(String::from("It began.\n\nIt ended.")),
            word_count: 4,
            created_at: "2024-07-01T10:00:00".parse().unwrap(),
            rating: RatingSummary::default(),
        };

        self.stories.lock().unwrap().push(story.clone());

        story
    }
}

#[async_trait::async_trait]
impl StoryApi for FakeApi {
    async fn universes(&self) -> Result<Vec<String>, ApiError> {
        self.enter("universes")?;

        Ok(vec!["Harry Potter".into(), "Star Wars".into()])
    }

    async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ApiError> {
        self.enter("generate_story")?;

        Ok(self.created(100, &request.universe, &request.what_if))
    }

    async fn generate_custom_story(
        &self,
        request: &CustomStoryRequest,
    ) -> Result<Story, ApiError> {
        self.enter("generate_custom_story")?;

        self.custom_requests.lock().unwrap().push(request.clone());

        Ok(self.created(200, &request.universe, &request.what_if))
    }

    async fn history(&self, limit: usize) -> Result<Vec<Story>, ApiError> {
        self.enter("history")?;

        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .map(|story| Story {
                story: None,
                ..story
            })
            .collect())
    }

    async fn story(&self, id: StoryId) -> Result<Story, ApiError> {
        self.enter("story")?;

        self.find(id)
            .map(|story| Story {
                story: Some(format!("The full text of story {}.", id)),
                ..story
            })
            .ok_or(ApiError::NotFound)
    }

    async fn rate_story(&self, id: StoryId, rating: Rating) -> Result<RatingSummary, ApiError> {
        self.enter("rate_story")?;

        let story = self.find(id).ok_or(ApiError::NotFound)?;
        self.ratings_sent.lock().unwrap().push((id, rating.get()));

        let count = story.rating.rating_count + 1;
        let total = story.rating.average() * f64::from(story.rating.rating_count)
            + f64::from(rating.get());

        Ok(RatingSummary::new(total / f64::from(count), count))
    }

    async fn ratings(&self, id: StoryId) -> Result<RatingSummary, ApiError> {
        self.enter("ratings")?;

        self.find(id).map(|story| story.rating).ok_or(ApiError::NotFound)
    }

    async fn share_story(&self, id: StoryId) -> Result<ShareToken, ApiError> {
        self.enter("share_story")?;

        self.find(id).ok_or(ApiError::NotFound)?;

        let token = format!("tok_{}", id);
        self.tokens.lock().unwrap().insert(token.clone(), id);

        Ok(ShareToken::parse(&token).unwrap())
    }

    async fn shared_story(&self, token: &ShareToken) -> Result<Story, ApiError> {
        self.enter("shared_story")?;

        let id = self
            .tokens
            .lock()
            .unwrap()
            .get(token.as_str())
            .copied()
            .ok_or(ApiError::NotFound)?;

        self.find(id).ok_or(ApiError::NotFound)
    }

    async fn system_prompt(&self, universe: &str) -> Result<String, ApiError> {
        self.enter("system_prompt")?;

        Ok(format!("You narrate {}.", universe))
    }
}

pub fn story(id: u64, universe: &str, created_at: &str, words: u32, average: f64) -> Story {
    Story {
        id: StoryId(id),
        universe: universe.to_string(),
        what_if: format!("What if #{}?", id),
        story: None,
        word_count: words,
        created_at: created_at.parse().unwrap(),
        rating: RatingSummary::new(average, u32::from(average > 0.0)),
    }
}

pub fn library() -> Vec<Story> {
    vec![
        story(1, "Star Wars", "2024-01-01", 100, 4.0),
        story(2, "Star Wars", "2024-06-01", 50, 5.0),
        story(3, "Harry Potter", "2024-03-01", 700, 0.0),
    ]
}
