use whatif_api::StoryApi;
use whatif_common::models::{ShareToken, Story, StoryId};

use crate::{
    rating::{self, RatingControl, Submission},
    Action, Liveness, Notice,
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ShareLink {
    pub story_id: StoryId,
    pub token: ShareToken,
    pub url: String,
}

pub fn share_url(public_url: &str, token: &ShareToken) -> String {
    format!("{}/share/{}", public_url.trim_end_matches('/'), token)
}

#[tracing::instrument(skip(api, public_url), fields(story_id = %story_id), err)]
pub async fn create_share_link<A>(
    api: &A,
    public_url: &str,
    story_id: StoryId,
) -> Result<ShareLink, Notice>
where
    A: StoryApi,
{
    let token = api
        .share_story(story_id)
        .await
        .map_err(|err| Notice::from_api(Action::Share, &err))?;

    Ok(ShareLink {
        story_id,
        url: share_url(public_url, &token),
        token,
    })
}

/// The public page a share link opens.
pub struct SharedStory<A> {
    api: A,
    liveness: Liveness,
    story: Option<Story>,
    loading: bool,
    rating: RatingControl,
    notice: Option<Notice>,
}

impl<A> SharedStory<A>
where
    A: StoryApi,
{
    pub fn new(api: A) -> Self {
        Self {
            api,
            liveness: Liveness::default(),
            story: None,
            loading: false,
            rating: RatingControl::default(),
            notice: None,
        }
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
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

    pub fn is_not_found(&self) -> bool {
        self.notice.as_ref().map_or(false, Notice::is_not_found)
    }

    fn raise(&mut self, notice: Notice) -> Notice {
        self.notice = Some(notice.clone());

        notice
    }

    /// Resolves a token; a malformed one is reported as not found without
    /// asking the service.
    #[tracing::instrument(skip(self), err)]
    pub async fn open(&mut self, token: &str) -> Result<(), Notice> {
        let token = match ShareToken::parse(token) {
            Ok(token) => token,
            Err(_) => return Err(self.raise(Notice::NotFound(Action::LoadShared))),
        };

        self.loading = true;
        self.notice = None;

        let res = self.api.shared_story(&token).await;

        if !self.liveness.is_alive() {
            return Ok(());
        }

        self.loading = false;

        match res {
            Ok(story) => {
                self.rating.reset();
                self.story = Some(story);

                Ok(())
            }
            Err(err) => Err(self.raise(Notice::from_api(Action::LoadShared, &err))),
        }
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn rate(&mut self, value: u8) -> Result<(), Notice> {
        let story_id = match &self.story {
            Some(story) => story.id,
            None => return Err(self.raise(Notice::NotFound(Action::LoadShared))),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_urls_join_cleanly() {
        let token = ShareToken::parse("abc123").unwrap();

        assert_eq!(
            share_url("https://whatif.example/", &token),
            "https://whatif.example/share/abc123"
        );
        assert_eq!(
            share_url("http://localhost:3000", &token),
            "http://localhost:3000/share/abc123"
        );
    }
}
