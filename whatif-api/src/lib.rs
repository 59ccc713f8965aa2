mod wire;

use isahc::{
    config::{Configurable as _, RedirectPolicy},
    http::{header, Method},
    AsyncReadResponseExt as _, HttpClient, Request,
};
use serde::de::DeserializeOwned;
use whatif_common::{
    models::{Length, Rating, RatingSummary, ShareToken, Story, StoryId},
    session::SessionId,
    utils::USER_AGENT,
    Conf, StatusCode, Uri,
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("service responded with {0}")]
    Status(StatusCode),
    #[error("invalid service url")]
    InvalidUrl(#[from] isahc::http::uri::InvalidUri),
    #[error("unable to build request")]
    Request(#[from] isahc::http::Error),
    #[error("unable to encode query")]
    Query(#[from] serde_urlencoded::ser::Error),
    #[error("request failed")]
    Transport(#[from] isahc::Error),
    #[error("unable to read response body")]
    Body(#[from] std::io::Error),
    #[error("unable to decode response")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StoryRequest {
    pub universe: String,
    pub what_if: String,
    pub length: Length,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CustomStoryRequest {
    pub universe: String,
    pub system_prompt: String,
    pub what_if: String,
    pub length: Length,
}

/// The remote story service, one method per endpoint.
#[async_trait::async_trait]
pub trait StoryApi: Send + Sync {
    /// `GET /universes`
    async fn universes(&self) -> Result<Vec<String>, ApiError>;

    /// `POST /story/generate`
    async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ApiError>;

    /// `POST /story/generate-custom`
    async fn generate_custom_story(&self, request: &CustomStoryRequest)
        -> Result<Story, ApiError>;

    /// `GET /story/history?limit=N`, list payloads may omit the story text
    async fn history(&self, limit: usize) -> Result<Vec<Story>, ApiError>;

    /// `GET /story/{id}`
    async fn story(&self, id: StoryId) -> Result<Story, ApiError>;

    /// `POST /story/{id}/rate`
    async fn rate_story(&self, id: StoryId, rating: Rating) -> Result<RatingSummary, ApiError>;

    /// `GET /story/{id}/ratings`
    async fn ratings(&self, id: StoryId) -> Result<RatingSummary, ApiError>;

    /// `POST /story/{id}/share`
    async fn share_story(&self, id: StoryId) -> Result<ShareToken, ApiError>;

    /// `GET /story/share/{token}`
    async fn shared_story(&self, token: &ShareToken) -> Result<Story, ApiError>;

    /// `POST /universe/system-prompt`
    async fn system_prompt(&self, universe: &str) -> Result<String, ApiError>;
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    session: SessionId,
    http: HttpClient,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionId) -> Result<Self, ApiError> {
        let base = base_url.trim().trim_end_matches('/').to_string();

        // catch a bad base url now rather than on the first request
        Uri::try_from(base.as_str())?;

        let http = HttpClient::builder()
            .default_header(header::USER_AGENT, USER_AGENT)
            .redirect_policy(RedirectPolicy::Follow)
            .build()?;

        Ok(Self {
            base,
            session,
            http,
        })
    }

    #[tracing::instrument(skip(conf), err)]
    pub fn from_conf(conf: &Conf) -> Result<Self, whatif_common::Report> {
        let session = conf.session()?;

        Ok(Self::new(conf.api_url(), session)?)
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    fn uri(&self, path: &str) -> Result<Uri, ApiError> {
        Ok(Uri::try_from(format!("{}{}", self.base, path))?)
    }

    async fn get<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let req = Request::builder()
            .method(Method::GET)
            .uri(self.uri(path)?)
            .body(Vec::new())?;

        self.send(req).await
    }

    async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let mut req = Request::builder().method(Method::POST).uri(self.uri(path)?);

        let body = match body {
            Some(body) => {
                req = req.header(header::CONTENT_TYPE, "application/json");

                serde_json::to_vec(body)?
            }
            None => Vec::new(),
        };

        self.send(req.body(body)?).await
    }

    async fn send<T>(&self, req: Request<Vec<u8>>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(method = %req.method(), uri = %req.uri(), "sending request");

        let mut res = self.http.send_async(req).await?;
        let status = res.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        if !status.is_success() {
            tracing::warn!(status = %status, "service returned an error");

            return Err(ApiError::Status(status));
        }

        let text = res.text().await?;

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl StoryApi for ApiClient {
    #[tracing::instrument(skip(self), err)]
    async fn universes(&self) -> Result<Vec<String>, ApiError> {
        let list: wire::UniverseList = self.get("/universes").await?;

        Ok(list.universes)
    }

    #[tracing::instrument(skip(self, request), fields(universe = %request.universe), err)]
    async fn generate_story(&self, request: &StoryRequest) -> Result<Story, ApiError> {
        let record: wire::StoryRecord = self.post("/story/generate", Some(request)).await?;

        Ok(record.into())
    }

    #[tracing::instrument(skip(self, request), fields(universe = %request.universe), err)]
    async fn generate_custom_story(
        &self,
        request: &CustomStoryRequest,
    ) -> Result<Story, ApiError> {
        let record: wire::StoryRecord =
            self.post("/story/generate-custom", Some(request)).await?;

        Ok(record.into())
    }

    #[tracing::instrument(skip(self), err)]
    async fn history(&self, limit: usize) -> Result<Vec<Story>, ApiError> {
        let query = serde_urlencoded::to_string(&[("limit", limit)])?;

        let page: wire::HistoryPage = self.get(&format!("/story/history?{}", query)).await?;

        tracing::debug!(count = page.stories.len(), "fetched history");

        Ok(page.stories.into_iter().map(Story::from).collect())
    }

    #[tracing::instrument(skip(self), fields(story_id = %id), err)]
    async fn story(&self, id: StoryId) -> Result<Story, ApiError> {
        let record: wire::StoryRecord = self.get(&format!("/story/{}", id)).await?;

        Ok(record.into())
    }

    #[tracing::instrument(skip(self), fields(story_id = %id), err)]
    async fn rate_story(&self, id: StoryId, rating: Rating) -> Result<RatingSummary, ApiError> {
        let body = wire::RateRequest {
            rating,
            session_id: &self.session,
        };

        let payload: wire::RatingPayload =
            self.post(&format!("/story/{}/rate", id), Some(&body)).await?;

        Ok(wire::rating_summary(payload))
    }

    #[tracing::instrument(skip(self), fields(story_id = %id), err)]
    async fn ratings(&self, id: StoryId) -> Result<RatingSummary, ApiError> {
        let payload: wire::RatingPayload = self.get(&format!("/story/{}/ratings", id)).await?;

        Ok(wire::rating_summary(payload))
    }

    #[tracing::instrument(skip(self), fields(story_id = %id), err)]
    async fn share_story(&self, id: StoryId) -> Result<ShareToken, ApiError> {
        let res: wire::ShareResponse = self
            .post::<(), _>(&format!("/story/{}/share", id), None)
            .await?;

        Ok(res.token)
    }

    #[tracing::instrument(skip(self), err)]
    async fn shared_story(&self, token: &ShareToken) -> Result<Story, ApiError> {
        let record: wire::StoryRecord = self.get(&format!("/story/share/{}", token)).await?;

        Ok(record.into())
    }

    #[tracing::instrument(skip(self), err)]
    async fn system_prompt(&self, universe: &str) -> Result<String, ApiError> {
        let res: wire::SystemPromptResponse = self
            .post(
                "/universe/system-prompt",
                Some(&wire::SystemPromptRequest { universe }),
            )
            .await?;

        Ok(res.system_prompt)
    }
}
