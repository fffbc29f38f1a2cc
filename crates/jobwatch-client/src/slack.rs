use std::time::Duration;

use jobwatch_core::error::AppError;
use jobwatch_core::models::{Category, JobDetail, Keyword};
use jobwatch_core::platform::Platform;
use jobwatch_core::traits::{ChatSurface, MessageRef, Notifier};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_API_URL: &str = "https://slack.com/api";
const JOB_COLOR: &str = "#36a64f";

/// Slack Web API access.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`).
    pub token: String,
    /// Channel new jobs and category lists are posted to.
    pub channel: String,
    /// Shared secret Slack sends with slash commands and interactive payloads.
    pub verification_token: String,
    pub api_url: String,
}

impl SlackConfig {
    /// Read configuration from environment variables.
    ///
    /// - `SLACK_TOKEN` (required)
    /// - `SLACK_CHANNEL_NAME` (required)
    /// - `SLACK_VERIFICATION_TOKEN` (required)
    /// - `SLACK_API_URL` (optional, defaults to `https://slack.com/api`)
    pub fn from_env() -> Result<Self, AppError> {
        let required = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::ConfigError(format!("{name} must be set")))
        };

        Ok(Self {
            token: required("SLACK_TOKEN")?,
            channel: required("SLACK_CHANNEL_NAME")?,
            verification_token: required("SLACK_VERIFICATION_TOKEN")?,
            api_url: std::env::var("SLACK_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Posts jobs and renders the filter configuration in Slack.
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    config: SlackConfig,
}

#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::ConfigError(format!("HTTP client error: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn verification_token(&self) -> &str {
        &self.config.verification_token
    }

    async fn call(&self, method: &str, body: &Value) -> Result<(), AppError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.config.api_url))
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::NotificationFailed(format!("{method}: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimitExceeded);
        }

        let parsed: SlackResponse = response
            .json()
            .await
            .map_err(|e| AppError::NotificationFailed(format!("{method}: bad response: {e}")))?;
        if !parsed.ok {
            return Err(AppError::NotificationFailed(format!(
                "{method}: {}",
                parsed.error.unwrap_or_else(|| "unknown error".into())
            )));
        }
        Ok(())
    }
}

impl Notifier for SlackClient {
    async fn notify(&self, platform: Platform, job: &JobDetail) -> Result<(), AppError> {
        let mut body = job_message(platform, job);
        body["channel"] = json!(self.config.channel);
        self.call("chat.postMessage", &body).await?;
        tracing::debug!(%platform, job_id = %job.id, "Job posted to Slack");
        Ok(())
    }
}

impl ChatSurface for SlackClient {
    async fn send_categories(
        &self,
        platform: Platform,
        categories: &[Category],
    ) -> Result<(), AppError> {
        let mut body = categories_message(platform, categories);
        body["channel"] = json!(self.config.channel);
        self.call("chat.postMessage", &body).await
    }

    async fn update_categories(
        &self,
        platform: Platform,
        message: &MessageRef,
        categories: &[Category],
    ) -> Result<(), AppError> {
        let mut body = categories_message(platform, categories);
        body["channel"] = json!(message.channel);
        body["ts"] = json!(message.ts);
        self.call("chat.update", &body).await
    }

    async fn open_keywords_dialog(
        &self,
        platform: Platform,
        trigger_id: &str,
        keywords: &[Keyword],
    ) -> Result<(), AppError> {
        self.call("dialog.open", &keywords_dialog(platform, trigger_id, keywords))
            .await
    }

    async fn send_error(&self, platform: Platform) -> Result<(), AppError> {
        let mut body = error_message(platform);
        body["channel"] = json!(self.config.channel);
        self.call("chat.postMessage", &body).await
    }
}

// ---- Message payloads ----

pub fn category_callback_id(platform: Platform) -> String {
    format!("{}_category", platform.as_str())
}

pub fn keywords_callback_id(platform: Platform) -> String {
    format!("{}_keywords", platform.as_str())
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

/// One attachment per job: title link, description, budget, employer, browser button.
pub fn job_message(platform: Platform, job: &JobDetail) -> Value {
    let employer = &job.employer;
    let mut fields = vec![
        json!({"title": "Description", "value": job.description}),
        json!({"title": "Budget", "value": job.budget.summary()}),
    ];
    if !job.skills.is_empty() {
        fields.push(json!({"title": "Skills", "value": job.skills.join(", ")}));
    }
    fields.push(json!({
        "title": "Employer",
        "value": format!(
            "- Name: {}\n- Country: {}\n- Feedback: {}\n- Paid: {}\n- Paid Jobs: {}",
            employer.name,
            optional(&employer.country),
            optional(&employer.feedback),
            optional(&employer.paid),
            optional(&employer.paid_jobs),
        ),
    }));

    json!({
        "username": platform.display_name(),
        "text": "",
        "attachments": [{
            "fallback": job.title,
            "color": JOB_COLOR,
            "title": job.title.to_uppercase(),
            "title_link": job.url,
            "fields": fields,
            "actions": [{
                "type": "button",
                "text": "Open In Browser",
                "url": job.url,
            }],
        }],
    })
}

/// Category list with one toggle button per category, ✔ marking selected ones.
pub fn categories_message(platform: Platform, categories: &[Category]) -> Value {
    let callback_id = category_callback_id(platform);
    let attachments: Vec<Value> = categories
        .iter()
        .map(|category| {
            let text = if category.selected {
                format!("{} ✔", category.name)
            } else {
                category.name.clone()
            };
            json!({
                "title": "",
                "color": "#fff",
                "callback_id": callback_id,
                "actions": [{
                    "name": category.name,
                    "text": text,
                    "type": "button",
                    "value": category.external_key,
                }],
            })
        })
        .collect();

    json!({
        "username": platform.display_name(),
        "text": format!(
            "{} categories: click on a category to select/unselect it.",
            platform.display_name()
        ),
        "attachments": attachments,
    })
}

pub fn keywords_dialog(platform: Platform, trigger_id: &str, keywords: &[Keyword]) -> Value {
    let current: Vec<&str> = keywords.iter().map(|k| k.value.as_str()).collect();
    json!({
        "trigger_id": trigger_id,
        "dialog": {
            "callback_id": keywords_callback_id(platform),
            "title": format!("{} keywords", platform.display_name()),
            "submit_label": "Save",
            "elements": [{
                "type": "textarea",
                "label": "Keywords",
                "name": "keywords",
                "value": current.join(", "),
                "hint": "Separate keywords with commas or new lines. Leave empty to get every job.",
                "optional": true,
            }],
        },
    })
}

pub fn error_message(platform: Platform) -> Value {
    json!({
        "username": platform.display_name(),
        "text": format!(
            "Something went wrong while updating the {} settings. Please try again.",
            platform.display_name()
        ),
    })
}
