use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A job marketplace jobwatch knows how to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// guru.com, scraped through an authenticated browser session.
    Guru,
    /// freelancer.com, read through its REST API.
    Freelancer,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Guru, Platform::Freelancer];

    /// Storage and wire key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Guru => "guru",
            Platform::Freelancer => "freelancer",
        }
    }

    /// Human-facing name, used in chat messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Guru => "Guru",
            Platform::Freelancer => "Freelancer",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "guru" => Ok(Platform::Guru),
            "freelancer" => Ok(Platform::Freelancer),
            _ => Err(AppError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Parse a comma-separated platform list such as `"guru, freelancer"`.
///
/// Duplicates collapse; an empty list is a configuration error.
pub fn parse_platform_list(raw: &str) -> Result<Vec<Platform>, AppError> {
    let mut platforms = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let platform: Platform = part.parse()?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    if platforms.is_empty() {
        return Err(AppError::ConfigError("no platforms enabled".into()));
    }
    Ok(platforms)
}
