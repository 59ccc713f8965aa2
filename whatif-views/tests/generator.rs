mod common;

use common::FakeApi;
use whatif_common::models::{Length, StoryId, ValidationError};
use whatif_views::{
    generator::{Generator, GeneratorForm, UniverseChoice},
    Action, Notice,
};

fn preset(what_if: &str) -> GeneratorForm {
    GeneratorForm {
        universe: UniverseChoice::Preset("Star Wars".into()),
        what_if: what_if.to_string(),
        length: Length::Medium,
    }
}

fn custom(name: &str, system_prompt: Option<&str>) -> GeneratorForm {
    GeneratorForm {
        universe: UniverseChoice::Custom {
            name: name.to_string(),
            system_prompt: system_prompt.map(str::to_string),
        },
        what_if: String::from("What if the Luggage could talk?"),
        length: Length::Long,
    }
}

#[tokio::test]
async fn universes_load_with_a_default() {
    let mut generator = Generator::new(FakeApi::default());

    generator.load_universes().await.unwrap();

    assert_eq!(generator.default_universe(), Some("Harry Potter"));
}

#[tokio::test]
async fn empty_premise_never_calls_the_service() {
    let mut generator = Generator::new(FakeApi::default());

    let notice = generator.generate(&preset("")).await.unwrap_err();

    assert_eq!(notice, Notice::Invalid(ValidationError::EmptyPremise));
    assert_eq!(notice.to_string(), "Please enter a \"What If\" scenario");
    assert!(generator.api().calls().is_empty());
    assert!(!generator.is_loading());
}

#[tokio::test]
async fn empty_custom_name_never_calls_the_service() {
    let mut generator = Generator::new(FakeApi::default());

    let notice = generator.generate(&custom(" ", None)).await.unwrap_err();

    assert_eq!(notice, Notice::Invalid(ValidationError::EmptyUniverseName));
    assert!(generator.api().calls().is_empty());
}

#[tokio::test]
async fn preset_generation_shows_the_story() {
    let mut generator = Generator::new(FakeApi::default());

    generator.generate(&preset("What if Vader won?")).await.unwrap();

    let story = generator.story().unwrap();
    assert_eq!(story.id, StoryId(100));
    assert_eq!(story.what_if, "What if Vader won?");
    assert_eq!(generator.api().calls(), ["generate_story"]);
    assert!(!generator.is_loading());
}

#[tokio::test]
async fn custom_universe_without_prompt_takes_two_round_trips() {
    let mut generator = Generator::new(FakeApi::default());

    generator.generate(&custom("Discworld", None)).await.unwrap();

    assert_eq!(
        generator.api().calls(),
        ["system_prompt", "generate_custom_story"]
    );

    let sent = generator.api().custom_requests.lock().unwrap().clone();
    assert_eq!(sent[0].system_prompt, "You narrate Discworld.");
    assert_eq!(sent[0].length, Length::Long);
    assert_eq!(generator.story().unwrap().id, StoryId(200));
}

#[tokio::test]
async fn custom_universe_with_prompt_goes_straight_to_generation() {
    let mut generator = Generator::new(FakeApi::default());

    generator
        .generate(&custom("Discworld", Some("Be Pratchett.")))
        .await
        .unwrap();

    assert_eq!(generator.api().calls(), ["generate_custom_story"]);
    assert_eq!(
        generator.api().custom_requests.lock().unwrap()[0].system_prompt,
        "Be Pratchett."
    );
}

#[tokio::test]
async fn failed_prompt_request_surfaces_one_error() {
    let mut generator = Generator::new(FakeApi::default());
    generator.api().fail("system_prompt");

    let notice = generator.generate(&custom("Discworld", None)).await.unwrap_err();

    assert_eq!(notice, Notice::Failed(Action::Generate));
    assert_eq!(generator.api().count("generate_custom_story"), 0);
    assert!(generator.story().is_none());
    assert!(!generator.is_loading());
}

#[tokio::test]
async fn failed_generation_clears_the_previous_story() {
    let mut generator = Generator::new(FakeApi::default());
    generator.generate(&preset("What if Vader won?")).await.unwrap();
    generator.api().fail("generate_story");

    let notice = generator.generate(&preset("What if Yoda fell?")).await.unwrap_err();

    assert_eq!(notice.to_string(), "Failed to generate story. Please try again.");
    assert!(generator.story().is_none());
    assert!(!generator.is_loading());
}

#[tokio::test]
async fn closing_between_round_trips_stops_generation() {
    let mut generator = Generator::new(FakeApi::default());
    generator
        .api()
        .close_during("system_prompt", generator.liveness());

    generator.generate(&custom("Discworld", None)).await.unwrap();

    assert_eq!(generator.api().calls(), ["system_prompt"]);
    assert!(generator.story().is_none());
}

#[tokio::test]
async fn generated_story_can_be_rated() {
    let mut generator = Generator::new(FakeApi::default());
    generator.generate(&preset("What if Vader won?")).await.unwrap();

    generator.rate(5).await.unwrap();

    let story = generator.story().unwrap();
    assert_eq!(story.rating.average(), 5.0);
    assert_eq!(story.rating.rating_count, 1);
    assert_eq!(
        generator.api().ratings_sent.lock().unwrap().clone(),
        [(StoryId(100), 5)]
    );
}
