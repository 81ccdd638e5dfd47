//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::auth::TokenService;
use crate::config::AuthConfig;
use crate::db::RosterStore;
use crate::roster::{FilterResolver, RosterService};
use crate::teachers::TeacherDirectory;
use crate::users::UserStore;
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Student search, count, detail and diagnostics
    pub roster: RosterService,

    /// Dropdown option resolution
    pub resolver: FilterResolver,

    pub teachers: TeacherDirectory,

    /// Portal login accounts
    pub users: UserStore,

    /// Bearer token signing and validation
    pub tokens: TokenService,
}

impl AppState {
    /// Wire the services over one roster store
    pub fn new(pool: Pool, store: Arc<dyn RosterStore>, auth: &AuthConfig) -> Self {
        Self {
            users: UserStore::new(pool),
            roster: RosterService::new(Arc::clone(&store)),
            resolver: FilterResolver::new(Arc::clone(&store)),
            teachers: TeacherDirectory::new(store),
            tokens: TokenService::new(auth),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
