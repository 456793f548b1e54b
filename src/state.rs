use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::session;
use crate::config::Config;
use crate::limiter::AttemptLimiter;
use crate::settings::SettingsStore;

pub type DbPool = Pool<SqliteConnectionManager>;

// Limiter tunables. Deterrence constants, not runtime configuration.
pub const LOGIN_WINDOW_SECS: i64 = 600;
pub const LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const VOTE_WINDOW_SECS: i64 = 3600;
pub const VOTE_MAX_ATTEMPTS: u32 = 50;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub settings: SettingsStore,
    pub login_limiter: Arc<AttemptLimiter>,
    pub vote_limiter: Arc<AttemptLimiter>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            settings: SettingsStore::new(db.clone()),
            db,
            config,
            login_limiter: Arc::new(AttemptLimiter::new(LOGIN_WINDOW_SECS, LOGIN_MAX_ATTEMPTS)),
            vote_limiter: Arc::new(AttemptLimiter::new(VOTE_WINDOW_SECS, VOTE_MAX_ATTEMPTS)),
        }
    }

    /// Digest of the configured admin passphrase, or `None` when the admin
    /// dashboard is unconfigured.
    pub fn admin_digest(&self) -> Option<String> {
        self.config
            .admin
            .password
            .as_deref()
            .map(session::compute_digest)
    }
}
