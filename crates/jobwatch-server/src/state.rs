use jobwatch_core::chat::ChatCommands;
use jobwatch_core::traits::{ChatSurface, FilterStore};
use jobwatch_db::Database;

/// Shared application state, available to all route handlers via `State<Arc<AppState<_, _>>>`.
pub struct AppState<F, C>
where
    F: FilterStore,
    C: ChatSurface,
{
    pub commands: ChatCommands<F, C>,
    /// Checked by `GET /health`.
    pub db: Database,
    /// Token Slack includes in every slash command and interactive payload.
    pub verification_token: String,
}
