use std::{env, io::Write};

use chapa_tools::GatewayConfig;
use chrono::Duration;
use log::*;
use mesob_common::Secret;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_MESOB_HOST: &str = "127.0.0.1";
const DEFAULT_MESOB_PORT: u16 = 8360;
const DEFAULT_PAYMENT_SWEEP_INTERVAL: Duration = Duration::seconds(60);
const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Chapa payment gateway credentials and URLs.
    pub gateway: GatewayConfig,
    /// How often the background worker re-checks gateway payments that have not been settled by the webhook.
    pub payment_sweep_interval: Duration,
    /// If set, a staff account with the Admin role is created on startup (unless the email is already taken).
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone, Debug)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MESOB_HOST.to_string(),
            port: DEFAULT_MESOB_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            gateway: GatewayConfig::default(),
            payment_sweep_interval: DEFAULT_PAYMENT_SWEEP_INTERVAL,
            bootstrap_admin: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MESOB_HOST").ok().unwrap_or_else(|| DEFAULT_MESOB_HOST.into());
        let port = env::var("MESOB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MESOB_PORT. {e} Using the default, {DEFAULT_MESOB_PORT}, \
                         instead."
                    );
                    DEFAULT_MESOB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MESOB_PORT);
        let database_url = env::var("MESOB_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MESOB_DATABASE_URL is not set. Please set it to the URL for the Mesob database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let gateway = GatewayConfig::new_from_env_or_default();
        let payment_sweep_interval = env::var("MESOB_PAYMENT_SWEEP_INTERVAL")
            .map_err(|_| {
                info!(
                    "🪛️ MESOB_PAYMENT_SWEEP_INTERVAL is not set. Using the default value of {}s.",
                    DEFAULT_PAYMENT_SWEEP_INTERVAL.num_seconds()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::seconds)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for MESOB_PAYMENT_SWEEP_INTERVAL. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PAYMENT_SWEEP_INTERVAL);
        let bootstrap_admin = BootstrapAdmin::from_env();
        Self { host, port, database_url, auth, gateway, payment_sweep_interval, bootstrap_admin }
    }
}

impl BootstrapAdmin {
    /// Reads `MESOB_ADMIN_EMAIL` and `MESOB_ADMIN_PASSWORD`. Both must be set for a bootstrap admin to be created.
    pub fn from_env() -> Option<Self> {
        let email = env::var("MESOB_ADMIN_EMAIL").ok()?;
        let password = match env::var("MESOB_ADMIN_PASSWORD") {
            Ok(p) => Secret::new(p),
            Err(_) => {
                warn!("🪛️ MESOB_ADMIN_EMAIL is set, but MESOB_ADMIN_PASSWORD is not. No bootstrap admin was created.");
                return None;
            },
        };
        Some(Self { email, password })
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify JWTs (HS256). Must be at least 32 characters long.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every restart will log all users out. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                         you are doing it wrong! Set the MESOB_JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("MESOB_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [MESOB_JWT_SECRET]")))?;
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ServerError::ConfigurationError(format!(
                "MESOB_JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long."
            )));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}
