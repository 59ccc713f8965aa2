use whatif_common::{Conf, Context as _, Report};

static NEON: &str = include_str!("../../assets/neon.css");
static LIBRARY: &str = include_str!("../../assets/library.css");
static GRADIENT: &str = include_str!("../../assets/gradient.css");

/// Look of every page, one stylesheet and heading per theme.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Theme {
    #[serde(rename = "neon")]
    Neon,
    #[default]
    #[serde(rename = "library")]
    Library,
    #[serde(rename = "gradient")]
    Gradient,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

impl Theme {
    pub fn from_conf(conf: &Conf) -> Result<Self, Report> {
        match conf.theme.as_deref().map(str::trim) {
            None | Some("") => Ok(Theme::default()),
            Some(name) => name
                .parse()
                .with_context(|| format!("unknown theme `{}`", name)),
        }
    }

    pub fn css(self) -> &'static str {
        match self {
            Theme::Neon => NEON,
            Theme::Library => LIBRARY,
            Theme::Gradient => GRADIENT,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Theme::Neon => "WHAT IF//MACHINE",
            Theme::Library => "The What If Library",
            Theme::Gradient => "What If...",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            Theme::Neon => "Rewrite the timeline.",
            Theme::Library => "Stories from the roads not taken.",
            Theme::Gradient => "Pick a universe, change one thing, see what happens.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf(theme: Option<&str>) -> Conf {
        Conf {
            api_url: None,
            public_url: None,
            session_file: None,
            session_id: None,
            theme: theme.map(str::to_string),
            bind: None,
        }
    }

    #[test]
    fn theme_comes_from_conf() {
        assert_eq!(Theme::from_conf(&conf(None)).unwrap(), Theme::Library);
        assert_eq!(Theme::from_conf(&conf(Some(" neon "))).unwrap(), Theme::Neon);
        assert_eq!(Theme::from_conf(&conf(Some(""))).unwrap(), Theme::Library);
        assert!(Theme::from_conf(&conf(Some("vaporwave"))).is_err());
    }

    #[test]
    fn themes_have_distinct_styles() {
        assert_ne!(Theme::Neon.css(), Theme::Library.css());
        assert_eq!(Theme::Gradient.to_string(), "gradient");
    }
}
