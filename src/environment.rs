use std::fmt::{Display, Formatter};
use std::{env, fmt};

pub const ENV_VAR: &str = "FOLIO_ENV";

/// Mode the site is built and served in. Fixed for the lifetime of a build.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildEnv {
    Development,
    Production,
    Test,
}

impl BuildEnv {
    /// Anything that is neither development nor test is a production build.
    pub fn parse(value: &str) -> BuildEnv {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => BuildEnv::Development,
            "test" => BuildEnv::Test,
            _ => BuildEnv::Production,
        }
    }

    pub fn from_env() -> BuildEnv {
        match env::var(ENV_VAR) {
            Ok(value) => Self::parse(&value),
            Err(_) => BuildEnv::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildEnv::Development => "development",
            BuildEnv::Production => "production",
            BuildEnv::Test => "test",
        }
    }

    pub fn is_development(&self) -> bool {
        *self == BuildEnv::Development
    }
}

impl Display for BuildEnv {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
