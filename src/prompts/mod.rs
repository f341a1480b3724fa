use minijinja::{AutoEscape, Environment};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// NOTE:
// User text is inserted verbatim. Auto-escaping is off for every template
// so quotes and markup reach the model exactly as typed.

/// Prompt variant baked into a deployment. Only one is active per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JokeTone {
    /// Family-friendly.
    #[default]
    Clean,
    /// Adult and suggestive.
    Mature,
    /// Vulgar.
    Explicit,
}

impl JokeTone {
    pub const ALL: [JokeTone; 3] = [JokeTone::Clean, JokeTone::Mature, JokeTone::Explicit];

    pub fn as_str(&self) -> &'static str {
        match self {
            JokeTone::Clean => "clean",
            JokeTone::Mature => "mature",
            JokeTone::Explicit => "explicit",
        }
    }

    fn template_name(&self) -> &'static str {
        match self {
            JokeTone::Clean => "joke/clean",
            JokeTone::Mature => "joke/mature",
            JokeTone::Explicit => "joke/explicit",
        }
    }
}

impl fmt::Display for JokeTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown joke tone `{0}` (expected clean, mature or explicit)")]
pub struct UnknownTone(pub String);

impl FromStr for JokeTone {
    type Err = UnknownTone;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clean" | "family" => Ok(JokeTone::Clean),
            "mature" | "spicy" => Ok(JokeTone::Mature),
            "explicit" | "vulgar" => Ok(JokeTone::Explicit),
            other => Err(UnknownTone(other.to_string())),
        }
    }
}

macro_rules! template_file {
    ($name:literal) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/templates/",
            $name,
            ".jinja"
        ))
    };
}

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(load_templates);

fn load_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    for (name, source) in [
        ("joke/clean", template_file!("clean")),
        ("joke/mature", template_file!("mature")),
        ("joke/explicit", template_file!("explicit")),
    ] {
        // Sources are compiled into the binary; a syntax error is a build defect.
        env.add_template(name, source)
            .unwrap_or_else(|err| panic!("invalid prompt template {name}: {err}"));
    }
    env
}

#[derive(Serialize)]
struct PromptContext<'a> {
    input: &'a str,
}

/// Render the instruction prompt for `tone` with `input` substituted in.
pub fn build_prompt(tone: JokeTone, input: &str) -> Result<String, minijinja::Error> {
    TEMPLATES
        .get_template(tone.template_name())?
        .render(PromptContext { input })
}
