pub mod models;
pub mod session;
pub mod utils;

pub use color_eyre::{
    eyre::{bail, eyre as err, Context, Report},
    install,
};
pub use http::{StatusCode, Uri};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_FILE: &str = ".whatif-session";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[twelf::config]
pub struct Conf {
    /// Base URL of the story service
    pub api_url: Option<String>,

    /// Public origin used when building share links
    pub public_url: Option<String>,

    /// File the rating session identifier is kept in
    pub session_file: Option<String>,

    /// Explicit rating session identifier, skips the session file
    pub session_id: Option<String>,

    /// Web front end theme: neon, library or gradient
    pub theme: Option<String>,

    /// Address the web front end listens on
    pub bind: Option<String>,
}

impl Conf {
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn public_url(&self) -> &str {
        self.public_url.as_deref().unwrap_or(DEFAULT_PUBLIC_URL)
    }

    pub fn session_file(&self) -> &str {
        self.session_file.as_deref().unwrap_or(DEFAULT_SESSION_FILE)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    /// Resolves the session identifier once, at startup.
    ///
    /// An explicit `session_id` wins, otherwise the session file is read
    /// (and created when missing).
    pub fn session(&self) -> Result<session::SessionId, Report> {
        match self.session_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(session::SessionId::from(id)),
            _ => session::load_or_create(self.session_file()),
        }
    }
}
