mod render;

use std::io::{self, Write as _};

use whatif_api::{ApiClient, StoryApi as _};
use whatif_common::{
    err,
    models::{Length, Rating, StoryId},
    Conf, Report,
};
use whatif_views::{
    archive::{Archive, SortMode, UniverseFilter},
    generator::{Generator, GeneratorForm, UniverseChoice},
    share::{self, SharedStory},
    stats,
    Action, Notice,
};

pub struct GenerateArgs {
    pub what_if: String,
    pub universe: Option<String>,
    pub custom_universe: Option<String>,
    pub system_prompt: Option<String>,
    pub length: Length,
}

#[tracing::instrument(skip(conf), err)]
pub async fn universes(conf: &Conf) -> Result<(), Report> {
    let api = ApiClient::from_conf(conf)?;

    let universes = api
        .universes()
        .await
        .map_err(|err| Notice::from_api(Action::LoadUniverses, &err))?;

    render::universes(&mut io::stdout().lock(), &universes)?;

    Ok(())
}

#[tracing::instrument(skip(conf, args), err)]
pub async fn generate(conf: &Conf, args: GenerateArgs) -> Result<(), Report> {
    let mut generator = Generator::new(ApiClient::from_conf(conf)?);

    let universe = match (args.custom_universe, args.universe) {
        (Some(name), _) => UniverseChoice::Custom {
            name,
            system_prompt: args.system_prompt,
        },
        (None, Some(universe)) => UniverseChoice::Preset(universe),
        (None, None) => {
            generator.load_universes().await?;

            let universe = generator
                .default_universe()
                .ok_or_else(|| err!("the service offers no universes"))?;

            tracing::info!(universe = %universe, "using default universe");

            UniverseChoice::Preset(universe.to_string())
        }
    };

    let form = GeneratorForm {
        universe,
        what_if: args.what_if,
        length: args.length,
    };

    generator.generate(&form).await?;

    if let Some(story) = generator.story() {
        render::story(&mut io::stdout().lock(), story, None)?;
    }

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn history(
    conf: &Conf,
    universe: &str,
    sort: SortMode,
    limit: usize,
) -> Result<(), Report> {
    let mut archive = Archive::new(ApiClient::from_conf(conf)?).with_limit(limit);

    archive.refresh().await?;

    let filter: UniverseFilter = match universe.parse() {
        Ok(filter) => filter,
        Err(never) => match never {},
    };

    archive.set_filter(filter);
    archive.set_sort(sort);

    render::list(
        &mut io::stdout().lock(),
        &archive.visible(),
        archive.stories().len(),
        archive.filter(),
        archive.sort(),
    )?;

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn show(conf: &Conf, id: StoryId) -> Result<(), Report> {
    let mut archive = Archive::new(ApiClient::from_conf(conf)?);

    archive.select_story(id).await?;

    if let Some(story) = archive.selected() {
        render::story(&mut io::stdout().lock(), story, None)?;
    }

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn rate(conf: &Conf, id: StoryId, value: u8) -> Result<(), Report> {
    // reject a bad value before opening the story
    Rating::new(value)?;

    let mut archive = Archive::new(ApiClient::from_conf(conf)?);

    archive.select_story(id).await?;
    archive.submit_rating(value).await?;

    if let Some(story) = archive.selected() {
        render::story(&mut io::stdout().lock(), story, Some(archive.rating_control()))?;
    }

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn share(conf: &Conf, id: StoryId) -> Result<(), Report> {
    let api = ApiClient::from_conf(conf)?;

    let link = share::create_share_link(&api, conf.public_url(), id).await?;

    render::share_link(&mut io::stdout().lock(), &link)?;

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn shared(conf: &Conf, token: &str, rating: Option<u8>) -> Result<(), Report> {
    let mut shared = SharedStory::new(ApiClient::from_conf(conf)?);

    shared.open(token).await?;

    if let Some(value) = rating {
        shared.rate(value).await?;
    }

    if let Some(story) = shared.story() {
        render::story(&mut io::stdout().lock(), story, Some(shared.rating_control()))?;
    }

    Ok(())
}

#[tracing::instrument(skip(conf), err)]
pub async fn stats(conf: &Conf) -> Result<(), Report> {
    let api = ApiClient::from_conf(conf)?;

    let stats = stats::load_stats(&api).await?;

    let mut out = io::stdout().lock();
    render::stats(&mut out, &stats)?;
    out.flush()?;

    Ok(())
}
