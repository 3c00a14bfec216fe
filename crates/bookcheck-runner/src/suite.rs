//! Suite selection by scenario tag

use crate::scenario::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Suite {
    /// Health check, id listing and short create/read/delete per fixture row
    Smoke,
    /// Full fixture-driven lifecycles and schema validation
    Regression,
    /// Lifecycle, inline rows, health check and id listing
    Integration,
    /// Requests the service must refuse
    Negative,
    /// Every scenario
    #[default]
    All,
}

impl Suite {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Integration => "integration",
            Self::Negative => "negative",
            Self::All => "all",
        }
    }

    /// Whether a scenario carrying `tags` belongs to this suite.
    #[must_use]
    pub fn selects(self, tags: &[Tag]) -> bool {
        let wanted = match self {
            Self::Smoke => Tag::Smoke,
            Self::Regression => Tag::Regression,
            Self::Integration => Tag::Integration,
            Self::Negative => Tag::Negative,
            Self::All => return true,
        };
        tags.contains(&wanted)
    }

    /// Whether the suite runs fixture-driven scenarios.
    #[must_use]
    pub const fn needs_fixtures(self) -> bool {
        matches!(self, Self::Smoke | Self::Regression | Self::All)
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smoke" => Ok(Self::Smoke),
            "regression" => Ok(Self::Regression),
            "integration" => Ok(Self::Integration),
            "negative" => Ok(Self::Negative),
            "all" => Ok(Self::All),
            other => Err(format!("unknown suite '{other}'")),
        }
    }
}
