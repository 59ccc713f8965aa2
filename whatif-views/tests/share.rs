mod common;

use common::{library, FakeApi};
use whatif_common::models::{RatingSummary, StoryId};
use whatif_views::{
    share::{create_share_link, SharedStory},
    Action, Notice,
};

#[tokio::test]
async fn shared_token_resolves_to_the_same_story() {
    let api = FakeApi::with_stories(vec![common::story(
        42,
        "DC",
        "2024-02-02",
        300,
        0.0,
    )]);

    let link = create_share_link(&api, "https://whatif.example", StoryId(42))
        .await
        .unwrap();

    assert_eq!(link.url, format!("https://whatif.example/share/{}", link.token));

    let mut shared = SharedStory::new(api);
    shared.open(link.token.as_str()).await.unwrap();

    assert_eq!(shared.story().unwrap().id, StoryId(42));
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let mut shared = SharedStory::new(FakeApi::with_stories(library()));

    let notice = shared.open("tok_nope").await.unwrap_err();

    assert_eq!(notice, Notice::NotFound(Action::LoadShared));
    assert!(shared.is_not_found());
    assert!(shared.story().is_none());
}

#[tokio::test]
async fn malformed_token_is_not_found_without_a_request() {
    let mut shared = SharedStory::new(FakeApi::with_stories(library()));

    let notice = shared.open("../../etc/passwd").await.unwrap_err();

    assert!(notice.is_not_found());
}

#[tokio::test]
async fn failing_service_is_not_reported_as_missing() {
    let api = FakeApi::with_stories(library());
    api.fail("shared_story");
    let mut shared = SharedStory::new(api);

    let notice = shared.open("tok_1").await.unwrap_err();

    assert_eq!(notice, Notice::Failed(Action::LoadShared));
    assert!(!shared.is_not_found());
}

#[tokio::test]
async fn sharing_a_missing_story_is_not_found() {
    let api = FakeApi::with_stories(library());

    let notice = create_share_link(&api, "http://localhost:3000", StoryId(7))
        .await
        .unwrap_err();

    assert_eq!(notice, Notice::NotFound(Action::Share));
}

#[tokio::test]
async fn shared_story_can_be_rated() {
    let api = FakeApi::with_stories(library());
    let link = create_share_link(&api, "http://localhost:3000", StoryId(1))
        .await
        .unwrap();
    let mut shared = SharedStory::new(api);
    shared.open(link.token.as_str()).await.unwrap();

    shared.rate(5).await.unwrap();

    assert_eq!(shared.story().unwrap().rating, RatingSummary::new(4.5, 2));
}
