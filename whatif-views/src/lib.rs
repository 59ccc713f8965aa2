//! View state for the story client.
//!
//! Each view owns its own state and talks to the service through a
//! [`StoryApi`](whatif_api::StoryApi). Failures never escape a view: they are
//! turned into a [`Notice`] the front end shows, and the state the view had
//! before the request is kept.

pub mod archive;
pub mod generator;
pub mod notice;
pub mod rating;
pub mod share;
pub mod stats;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

pub use notice::{Action, Notice};

/// Whether the view that started a request is still around to receive it.
///
/// Cloned handles share one flag; once any of them is closed, responses that
/// arrive afterwards are dropped instead of being applied.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}
