//! Backend entry-point: loads settings, picks the store and serves the API.

use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use forum_backend::inbound::http::health::HealthState;
use forum_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use forum_backend::outbound::token::{JwtTokenService, MIN_SECRET_LEN};
use forum_backend::server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let secret = load_signing_secret(&settings)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = JwtTokenService::new(secret, settings.token_ttl()?, clock.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let mut config = ServerConfig::new(settings.bind_addr()?, Arc::new(tokens))
        .with_clock(clock)
        .with_request_timeout(settings.request_timeout())
        .with_failure_policy(settings.failure_policy());

    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            let pool = DbPool::new(
                PoolConfig::new(url)
                    .with_max_size(settings.db_max_connections())
                    .with_checkout_timeout(settings.request_timeout() / 2),
            )
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("no database URL configured; using the in-memory store");
        }
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!("forum backend started");
    server.await
}

/// Read the token signing secret, or mint a random one when allowed.
///
/// Ephemeral secrets are accepted in debug builds or when
/// `FORUM_ALLOW_EPHEMERAL_SECRET` is set; tokens then die with the process.
fn load_signing_secret(settings: &ServerSettings) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let path = settings.jwt_secret_file();
    match read_secret(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            if cfg!(debug_assertions) || settings.allow_ephemeral_secret {
                warn!(path = %path.display(), error = %e, "using temporary signing secret (dev only)");
                let mut bytes = Zeroizing::new(vec![0_u8; MIN_SECRET_LEN * 2]);
                OsRng.fill_bytes(&mut bytes);
                Ok(bytes)
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read signing secret at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

fn read_secret(path: &Path) -> std::io::Result<Zeroizing<Vec<u8>>> {
    let mut bytes = Zeroizing::new(std::fs::read(path)?);
    while bytes.last().is_some_and(u8::is_ascii_whitespace) {
        bytes.pop();
    }
    Ok(bytes)
}
