//! Chat command handling.
//!
//! Slash commands and interactive callbacks end up here. Store failures are
//! reported back to the user through [`ChatSurface::send_error`] instead of
//! propagating to the HTTP layer.

use crate::error::AppError;
use crate::filters::parse_keywords;
use crate::platform::Platform;
use crate::traits::{ChatSurface, FilterStore, MessageRef};

#[derive(Clone)]
pub struct ChatCommands<F, C>
where
    F: FilterStore,
    C: ChatSurface,
{
    filters: F,
    chat: C,
}

impl<F, C> ChatCommands<F, C>
where
    F: FilterStore,
    C: ChatSurface,
{
    pub fn new(filters: F, chat: C) -> Self {
        Self { filters, chat }
    }

    /// Post the category list with one toggle button per category.
    pub async fn show_categories(&self, platform: Platform) {
        let result = async {
            let categories = self.filters.list_categories(platform).await?;
            self.chat.send_categories(platform, &categories).await
        }
        .await;
        self.settle(platform, "show_categories", result).await;
    }

    /// Flip one category and redraw the message the button belonged to.
    pub async fn toggle_category(&self, platform: Platform, external_key: &str, message: &MessageRef) {
        let result = async {
            let category = self.filters.flip_selection(platform, external_key).await?;
            tracing::info!(
                %platform,
                category = %category.name,
                selected = category.selected,
                "Category toggled"
            );
            let categories = self.filters.list_categories(platform).await?;
            self.chat
                .update_categories(platform, message, &categories)
                .await
        }
        .await;
        self.settle(platform, "toggle_category", result).await;
    }

    /// Open the keyword dialog pre-filled with the current keywords.
    pub async fn show_keywords(&self, platform: Platform, trigger_id: &str) {
        let result = async {
            let keywords = self.filters.list_keywords(platform).await?;
            self.chat
                .open_keywords_dialog(platform, trigger_id, &keywords)
                .await
        }
        .await;
        self.settle(platform, "show_keywords", result).await;
    }

    /// Store the keywords typed into the dialog (comma or newline separated).
    pub async fn submit_keywords(&self, platform: Platform, raw: &str) {
        let values = parse_keywords(raw);
        let count = values.len();
        let result = self.filters.set_keywords(platform, &values).await;
        if result.is_ok() {
            tracing::info!(%platform, %count, "Keywords updated");
        }
        self.settle(platform, "submit_keywords", result).await;
    }

    async fn settle(&self, platform: Platform, command: &str, result: Result<(), AppError>) {
        let Err(error) = result else {
            return;
        };
        tracing::warn!(%platform, %command, %error, kind = error.kind(), "Chat command failed");
        if let Err(e) = self.chat.send_error(platform).await {
            tracing::error!(%platform, error = %e, "Failed to send error message");
        }
    }
}
