pub mod pages;
pub mod theme;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use askama::Template;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Extension, Form, Path, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router, Server,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use whatif_api::{ApiClient, StoryApi as _};
use whatif_common::{
    models::{Rating, StoryId},
    Conf, Context as _, Report,
};
use whatif_views::{
    archive::Archive,
    generator::Generator,
    share::SharedStory,
    stats::{self, Stats},
    Action, Notice,
};

use crate::{
    pages::{
        GenerateForm, GeneratorPage, HistoryPage, HistoryQuery, Layout, ProblemPage, RateForm,
        SharePage, SharedPage, StatsPage, StoryCard,
    },
    theme::Theme,
};

/// What every handler shares: the service client and how pages look.
pub struct Site {
    pub api: ApiClient,
    pub theme: Theme,
    pub public_url: String,
}

impl Site {
    pub fn from_conf(conf: &Conf) -> Result<Self, Report> {
        Ok(Self {
            api: ApiClient::from_conf(conf)?,
            theme: Theme::from_conf(conf)?,
            public_url: conf.public_url().to_string(),
        })
    }

    fn layout(&self, notice: Option<&Notice>) -> Layout {
        Layout::new(self.theme, notice.map(ToString::to_string))
    }
}

pub async fn run(conf: &Conf) -> Result<(), Report> {
    let site = Site::from_conf(conf)?;
    let theme = site.theme;

    let addr: SocketAddr = conf
        .bind()
        .parse()
        .with_context(|| format!("invalid bind address `{}`", conf.bind()))?;

    tracing::info!(addr = %addr, theme = %theme, "starting web server");

    Server::bind(&addr)
        .serve(router(site).into_make_service())
        .await?;

    Ok(())
}

pub fn router(site: Site) -> Router {
    Router::new()
        .route("/", get(generator))
        .route("/generate", post(generate))
        .route("/history", get(history))
        .route("/history/:id/rate", post(history_rate))
        .route("/history/:id/share", post(history_share))
        .route("/share/:token", get(shared))
        .route("/share/:token/rate", post(shared_rate))
        .route("/stats", get(stats_page))
        .route("/api/history", get(history_api))
        .route("/api/history/:id/ratings", get(ratings_api))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        (StatusCode::REQUEST_TIMEOUT, String::new())
                    } else {
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    }
                }))
                .load_shed()
                .concurrency_limit(1024)
                .timeout(Duration::from_secs(10))
                .layer(Extension(Arc::new(site)))
                .layer(TraceLayer::new_for_http())
                .into_inner(),
        )
}

/// Status a page is served with when a view raised `notice`.
fn status_of(notice: Option<&Notice>) -> StatusCode {
    match notice {
        None => StatusCode::OK,
        Some(Notice::Invalid(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(Notice::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(Notice::Failed(_)) => StatusCode::BAD_GATEWAY,
    }
}

fn page<T>(status: StatusCode, page: T) -> Result<Response, Error>
where
    T: Template,
{
    let body = page.render().map_err(Error::from_any)?;

    Ok((status, Html(body)).into_response())
}

fn problem(site: &Site, notice: &Notice) -> Result<Response, Error> {
    let status = status_of(Some(notice));

    page(
        status,
        ProblemPage {
            layout: site.layout(None),
            code: status.as_u16(),
            message: notice.to_string(),
        },
    )
}

async fn generator(Extension(site): Extension<Arc<Site>>) -> Result<Response, Error> {
    let mut generator = Generator::new(site.api.clone());

    let notice = generator.load_universes().await.err();

    page(
        status_of(notice.as_ref()),
        GeneratorPage::new(
            site.layout(notice.as_ref()),
            generator.universes(),
            &GenerateForm::default(),
            None,
        ),
    )
}

async fn generate(
    Extension(site): Extension<Arc<Site>>,
    Form(form): Form<GenerateForm>,
) -> Result<Response, Error> {
    let mut generator = Generator::new(site.api.clone());

    let listed = generator.load_universes().await;
    let generated = generator.generate(&form.to_form()).await;

    let notice = generated.err().or_else(|| listed.err());

    let story = generator
        .story()
        .map(|story| StoryCard::new(story).with_control(generator.rating_control()));

    page(
        status_of(notice.as_ref()),
        GeneratorPage::new(
            site.layout(notice.as_ref()),
            generator.universes(),
            &form,
            story,
        ),
    )
}

fn history_page(
    site: &Site,
    archive: &Archive<ApiClient>,
    notice: Option<Notice>,
) -> Result<Response, Error> {
    let selected = archive
        .selected()
        .map(|story| StoryCard::new(story).with_control(archive.rating_control()));

    let history = HistoryPage::new(
        site.layout(notice.as_ref()),
        &archive.universe_options(),
        archive.filter(),
        archive.sort(),
        archive.stories().len(),
        &archive.visible(),
        selected,
    )
    .map_err(Error::from_any)?;

    page(status_of(notice.as_ref()), history)
}

fn archive(site: &Site, query: &HistoryQuery) -> Archive<ApiClient> {
    let mut archive = Archive::new(site.api.clone());

    archive.set_filter(query.filter());
    archive.set_sort(query.sort);

    archive
}

async fn history(
    Extension(site): Extension<Arc<Site>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, Error> {
    let mut archive = archive(&site, &query);

    let listed = archive.refresh().await;

    let opened = match query.story {
        Some(id) => archive.select_story(id).await,
        None => Ok(()),
    };

    if let Err(notice) = &opened {
        if notice.is_not_found() {
            return problem(&site, notice);
        }
    }

    history_page(&site, &archive, listed.err().or_else(|| opened.err()))
}

async fn history_rate(
    Extension(site): Extension<Arc<Site>>,
    Path(id): Path<StoryId>,
    Form(form): Form<RateForm>,
) -> Result<Response, Error> {
    if let Err(err) = Rating::new(form.rating) {
        return problem(&site, &Notice::from(err));
    }

    let mut archive = archive(&site, &form.query());

    let listed = archive.refresh().await;

    let rated = match archive.select_story(id).await {
        Ok(()) => archive.submit_rating(form.rating).await,
        Err(notice) if notice.is_not_found() => return problem(&site, &notice),
        Err(notice) => Err(notice),
    };

    history_page(&site, &archive, rated.err().or_else(|| listed.err()))
}

async fn history_share(
    Extension(site): Extension<Arc<Site>>,
    Path(id): Path<StoryId>,
) -> Result<Response, Error> {
    let mut archive = Archive::new(site.api.clone());

    match archive.select_story(id).await {
        Ok(()) => {}
        Err(notice) if notice.is_not_found() => return problem(&site, &notice),
        Err(notice) => return history_page(&site, &archive, Some(notice)),
    }

    let shared = archive.share_selected(&site.public_url).await;

    if let Err(notice) = &shared {
        if notice.is_not_found() {
            return problem(&site, notice);
        }
    }

    let story = match archive.selected() {
        Some(story) => StoryCard::new(story),
        None => return problem(&site, &Notice::NotFound(Action::Share)),
    };

    let notice = shared.as_ref().err();

    page(
        status_of(notice),
        SharePage::new(site.layout(notice), story, shared.as_ref().ok()),
    )
}

fn shared_page(
    site: &Site,
    token: String,
    shared: &SharedStory<ApiClient>,
    notice: Option<Notice>,
) -> Result<Response, Error> {
    if let Some(notice) = notice.as_ref().filter(|notice| notice.is_not_found()) {
        return problem(site, notice);
    }

    let story = shared
        .story()
        .map(|story| StoryCard::new(story).with_control(shared.rating_control()));

    page(
        status_of(notice.as_ref()),
        SharedPage {
            layout: site.layout(notice.as_ref()),
            token,
            story,
            ratings: pages::rating_values(),
        },
    )
}

async fn shared(
    Extension(site): Extension<Arc<Site>>,
    Path(token): Path<String>,
) -> Result<Response, Error> {
    let mut shared = SharedStory::new(site.api.clone());

    let notice = shared.open(&token).await.err();

    shared_page(&site, token, &shared, notice)
}

async fn shared_rate(
    Extension(site): Extension<Arc<Site>>,
    Path(token): Path<String>,
    Form(form): Form<RateForm>,
) -> Result<Response, Error> {
    if let Err(err) = Rating::new(form.rating) {
        return problem(&site, &Notice::from(err));
    }

    let mut shared = SharedStory::new(site.api.clone());

    let notice = match shared.open(&token).await {
        Ok(()) => shared.rate(form.rating).await.err(),
        Err(notice) => Some(notice),
    };

    shared_page(&site, token, &shared, notice)
}

async fn stats_page(Extension(site): Extension<Arc<Site>>) -> Result<Response, Error> {
    let (stats, notice) = match stats::load_stats(&site.api).await {
        Ok(stats) => (stats, None),
        Err(notice) => (Stats::collect(&[]), Some(notice)),
    };

    page(
        status_of(notice.as_ref()),
        StatsPage::new(site.layout(notice.as_ref()), &stats),
    )
}

async fn history_api(
    Extension(site): Extension<Arc<Site>>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, Error> {
    let mut archive = archive(&site, &query);

    archive.refresh().await?;

    Ok(Json(archive.visible()))
}

async fn ratings_api(
    Extension(site): Extension<Arc<Site>>,
    Path(id): Path<StoryId>,
) -> Result<impl IntoResponse, Error> {
    let summary = site
        .api
        .ratings(id)
        .await
        .map_err(|err| Notice::from_api(Action::LoadRatings, &err))?;

    Ok(Json(summary))
}

#[derive(Debug)]
pub enum Error {
    Notice(Notice),
    Internal(Report),
}

impl Error {
    pub fn from_any<A>(err: A) -> Self
    where
        A: Into<Report>,
    {
        Self::Internal(err.into())
    }
}

impl From<Notice> for Error {
    fn from(notice: Notice) -> Self {
        Self::Notice(notice)
    }
}

impl From<Report> for Error {
    fn from(err: Report) -> Self {
        Self::Internal(err)
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum_core::response::Response {
        #[derive(serde::Serialize)]
        struct Res {
            error: ResErr,
        }

        #[derive(serde::Serialize)]
        struct ResErr {
            code: u16,
            status: String,
        }

        let (status, message) = match self {
            Error::Notice(notice) => (status_of(Some(&notice)), notice.to_string()),
            Error::Internal(err) => {
                tracing::error!(error = ?err, "error handling request");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("internal server error"),
                )
            }
        };

        let body = Res {
            error: ResErr {
                code: status.as_u16(),
                status: message,
            },
        };

        (status, Json(body)).into_response()
    }
}
