//! Server settings and the builder-style server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::AggregationFailurePolicy;
use crate::domain::ports::TokenService;
use crate::outbound::persistence::DbPool;
use crate::outbound::token::MAX_TTL_HOURS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SECRET_PATH: &str = "/var/run/secrets/jwt_secret";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Process settings layered from defaults, `FORUM_*` environment variables
/// and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORUM")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the token signing secret.
    pub jwt_secret_file: Option<PathBuf>,
    /// Permit a random per-process secret when the file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Token lifetime in hours.
    pub token_ttl_hours: Option<i64>,
    /// Per-request time budget in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Report neutral counts instead of failing when vote aggregation fails.
    #[ortho_config(default = false)]
    pub aggregation_fail_open: bool,
}

impl ServerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the address does not parse.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    pub fn jwt_secret_file(&self) -> PathBuf {
        self.jwt_secret_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_PATH))
    }

    /// Token lifetime, defaulting to 24 hours.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the hour count is not between one and
    /// [`MAX_TTL_HOURS`].
    pub fn token_ttl(&self) -> std::io::Result<chrono::Duration> {
        let hours = self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if !(1..=MAX_TTL_HOURS).contains(&hours) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("token TTL must be between 1 and {MAX_TTL_HOURS} hours, got {hours}"),
            ));
        }
        Ok(chrono::Duration::hours(hours))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn failure_policy(&self) -> AggregationFailurePolicy {
        if self.aggregation_fail_open {
            AggregationFailurePolicy::FailOpen
        } else {
            AggregationFailurePolicy::Propagate
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tokens: Arc<dyn TokenService>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) request_timeout: Duration,
    pub(crate) failure_policy: AggregationFailurePolicy,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            bind_addr,
            tokens,
            clock: Arc::new(DefaultClock),
            db_pool: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            failure_policy: AggregationFailurePolicy::default(),
        }
    }

    /// Attach a database connection pool; services then use PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: AggregationFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "FORUM_BIND_ADDR",
        "FORUM_DATABASE_URL",
        "FORUM_DB_MAX_CONNECTIONS",
        "FORUM_JWT_SECRET_FILE",
        "FORUM_ALLOW_EPHEMERAL_SECRET",
        "FORUM_TOKEN_TTL_HOURS",
        "FORUM_REQUEST_TIMEOUT_SECS",
        "FORUM_AGGREGATION_FAIL_OPEN",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("forum-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.jwt_secret_file(), PathBuf::from(DEFAULT_SECRET_PATH));
        assert!(!settings.allow_ephemeral_secret);
        assert_eq!(
            settings.token_ttl().expect("default ttl"),
            chrono::Duration::hours(24)
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.failure_policy(), AggregationFailurePolicy::Propagate);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("FORUM_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "FORUM_DATABASE_URL",
                Some("postgres://forum@localhost/forum".to_owned()),
            ),
            ("FORUM_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("FORUM_JWT_SECRET_FILE", Some("/tmp/jwt".to_owned())),
            ("FORUM_ALLOW_EPHEMERAL_SECRET", Some("true".to_owned())),
            ("FORUM_TOKEN_TTL_HOURS", Some("2".to_owned())),
            ("FORUM_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("FORUM_AGGREGATION_FAIL_OPEN", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://forum@localhost/forum")
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(settings.jwt_secret_file(), PathBuf::from("/tmp/jwt"));
        assert!(settings.allow_ephemeral_secret);
        assert_eq!(
            settings.token_ttl().expect("ttl"),
            chrono::Duration::hours(2)
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.failure_policy(), AggregationFailurePolicy::FailOpen);
    }

    #[rstest]
    fn malformed_bind_addresses_are_reported() {
        let _guard = lock_env([("FORUM_BIND_ADDR", Some("nowhere".to_owned()))]);

        let settings = load_from_empty_args();
        let err = settings.bind_addr().expect_err("address should not parse");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("8761")]
    #[case("10000000000")]
    fn out_of_range_token_lifetimes_are_reported(#[case] hours: &str) {
        let _guard = lock_env([("FORUM_TOKEN_TTL_HOURS", Some(hours.to_owned()))]);

        let settings = load_from_empty_args();
        let err = settings.token_ttl().expect_err("ttl should be rejected");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
