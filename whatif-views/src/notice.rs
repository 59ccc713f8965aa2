use whatif_api::ApiError;
use whatif_common::models::ValidationError;

/// The user action a request was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    LoadUniverses,
    LoadHistory,
    LoadStory,
    LoadShared,
    LoadRatings,
    Generate,
    Rate,
    Share,
}

impl Action {
    fn failure(self) -> &'static str {
        match self {
            Action::LoadUniverses => "Failed to load universes",
            Action::LoadHistory => "Failed to load stories",
            Action::LoadStory => "Failed to load story",
            Action::LoadShared => "Failed to load shared story",
            Action::LoadRatings => "Failed to load ratings",
            Action::Generate => "Failed to generate story. Please try again.",
            Action::Rate => "Failed to save rating.",
            Action::Share => "Failed to create share link",
        }
    }

    fn missing(self) -> &'static str {
        match self {
            Action::LoadShared => "Story not found or link is invalid",
            _ => "Story not found",
        }
    }

    /// Actions aimed at one existing story, where a 404 means it is gone.
    fn targets_story(self) -> bool {
        matches!(
            self,
            Action::LoadStory
                | Action::LoadShared
                | Action::LoadRatings
                | Action::Rate
                | Action::Share
        )
    }
}

/// Something to tell the user.
///
/// The message is always one of a fixed set; the underlying error is only
/// logged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Notice {
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("{}", .0.missing())]
    NotFound(Action),
    #[error("{}", .0.failure())]
    Failed(Action),
}

impl Notice {
    pub fn from_api(action: Action, err: &ApiError) -> Self {
        tracing::error!(error = ?err, action = ?action, "request failed");

        if err.is_not_found() && action.targets_story() {
            Notice::NotFound(action)
        } else {
            Notice::Failed(action)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Notice::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whatif_common::StatusCode;

    #[test]
    fn remote_failures_use_fixed_messages() {
        let notice = Notice::from_api(
            Action::Generate,
            &ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR),
        );

        assert_eq!(notice, Notice::Failed(Action::Generate));
        assert_eq!(notice.to_string(), "Failed to generate story. Please try again.");
    }

    #[test]
    fn missing_shared_story_is_not_found() {
        let notice = Notice::from_api(Action::LoadShared, &ApiError::NotFound);

        assert!(notice.is_not_found());
        assert_eq!(notice.to_string(), "Story not found or link is invalid");
    }

    #[test]
    fn missing_history_is_a_plain_failure() {
        let notice = Notice::from_api(Action::LoadHistory, &ApiError::NotFound);

        assert_eq!(notice, Notice::Failed(Action::LoadHistory));
    }

    #[test]
    fn validation_messages_pass_through() {
        let notice = Notice::from(ValidationError::EmptyPremise);

        assert_eq!(notice.to_string(), "Please enter a \"What If\" scenario");
    }
}
