//! The per-client identifier that ratings are attributed to.
//!
//! It is generated on first use and kept in a small file. The lookup is
//! read-then-write-if-absent, so two processes starting for the very first
//! time at once may each write their own identifier; the last one wins.

use std::{fmt, io, path::Path};

use rand::Rng as _;

use crate::{Context as _, Report};

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[derive(serde::Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    const ALPHABET: &'static [u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    /// `session_<unix millis>_<9 base36 chars>`
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();

        let suffix: String = (0..9)
            .map(|_| Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())] as char)
            .collect();

        Self(format!(
            "session_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()), err)]
pub fn load_or_create(path: impl AsRef<Path>) -> Result<SessionId, Report> {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(existing) if !existing.trim().is_empty() => {
            tracing::debug!("using stored session");

            return Ok(SessionId::from(existing.trim()));
        }
        Ok(_) => tracing::debug!("session file is empty"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("unable to read session file `{}`", path.display()))
        }
    }

    let session = SessionId::generate();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("unable to create `{}`", parent.display()))?;
    }

    std::fs::write(path, session.as_str())
        .with_context(|| format!("unable to write session file `{}`", path.display()))?;

    tracing::info!(session = %session, "created new session");

    Ok(session)
}
