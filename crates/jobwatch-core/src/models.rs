use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::platform::Platform;
use crate::util::derive_job_id;

/// Minimal identity of a listed job, enough to deduplicate against the watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    /// URL or opaque reference the detail fetch resolves.
    pub locator: String,
}

impl JobSummary {
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
        }
    }

    /// Build a summary for a source without an explicit id field.
    pub fn from_locator(locator: impl Into<String>) -> Self {
        let locator = locator.into();
        Self {
            id: derive_job_id(&locator),
            locator,
        }
    }
}

/// How a job is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "lowercase")]
pub enum BudgetInfo {
    Fixed {
        amount: String,
        /// Source wording for the budget type, e.g. "Fixed Price".
        kind: String,
    },
    Hourly {
        days: Option<String>,
        hours: Option<String>,
        rate: String,
    },
}

impl BudgetInfo {
    /// One-line summary for chat messages.
    pub fn summary(&self) -> String {
        match self {
            BudgetInfo::Fixed { amount, kind } => format!("{kind}: {amount}"),
            BudgetInfo::Hourly { days, hours, rate } => {
                let mut parts = vec![format!("Hourly: {rate}")];
                if let Some(hours) = hours {
                    parts.push(format!("{hours} hours"));
                }
                if let Some(days) = days {
                    parts.push(format!("{days} days"));
                }
                parts.join(", ")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerInfo {
    pub name: String,
    pub country: Option<String>,
    pub feedback: Option<String>,
    pub paid: Option<String>,
    pub paid_jobs: Option<String>,
}

/// Full record of a job, produced only by a source adapter's detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub budget: BudgetInfo,
    pub skills: Vec<String>,
    pub employer: EmployerInfo,
}

/// A job category a user can opt into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub platform: Platform,
    pub name: String,
    /// Source-side key: a URL slug on Guru, a numeric id on Freelancer.
    pub external_key: String,
    pub selected: bool,
}

/// A category as returned by a source during a category refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub external_key: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, external_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_key: external_key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub platform: Platform,
    pub value: String,
}

/// The most recently delivered job for a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    pub platform: Platform,
    pub last_job_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_consistency() {
        let h1 = compute_hash("hello world");
        let h2 = compute_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_summary_from_locator_derives_id() {
        let summary =
            JobSummary::from_locator("https://www.guru.com/jobs/build-a-shop/1987654&SearchUrl=x");
        assert_eq!(summary.id, "1987654");
    }

    #[test]
    fn test_budget_summary() {
        let fixed = BudgetInfo::Fixed {
            amount: "$1,500".into(),
            kind: "Fixed Price".into(),
        };
        assert_eq!(fixed.summary(), "Fixed Price: $1,500");

        let hourly = BudgetInfo::Hourly {
            days: Some("30".into()),
            hours: Some("40".into()),
            rate: "$15 - $25/hr".into(),
        };
        assert_eq!(hourly.summary(), "Hourly: $15 - $25/hr, 40 hours, 30 days");
    }

    #[test]
    fn test_budget_serializes_with_basis_tag() {
        let fixed = BudgetInfo::Fixed {
            amount: "$100".into(),
            kind: "Fixed Price".into(),
        };
        let json = serde_json::to_value(&fixed).unwrap();
        assert_eq!(json["basis"], "fixed");
        assert_eq!(json["kind"], "Fixed Price");
    }
}
