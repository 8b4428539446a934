use std::{env, time::Duration};

use log::*;
use mercadopago_tools::MercadoPagoConfig;
use pix_common::{parse_boolean_flag, Secret};
use pix_payment_engine::PollerConfig;

const DEFAULT_PIX_HOST: &str = "127.0.0.1";
const DEFAULT_PIX_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/pix_store.db";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 600;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    /// How often, and for how long, pending payments are polled
    pub poller: PollerConfig,
    pub mercadopago: MercadoPagoConfig,
    /// Secret used to verify the `x-signature` header on webhook calls. Signature checks are off when this is unset.
    pub webhook_secret: Option<Secret<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PIX_HOST.to_string(),
            port: DEFAULT_PIX_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            poller: PollerConfig::default(),
            mercadopago: MercadoPagoConfig::default(),
            webhook_secret: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PIX_HOST").ok().unwrap_or_else(|| DEFAULT_PIX_HOST.into());
        let port = env::var("PIX_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PIX_PORT. {e} Using the default, {DEFAULT_PIX_PORT}, instead."
                    );
                    DEFAULT_PIX_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PIX_PORT);
        let database_url = env::var("PIX_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ PIX_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("PIX_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("PIX_USE_FORWARDED").ok(), false);
        let interval = seconds_from_env("PIX_POLL_INTERVAL", DEFAULT_POLL_INTERVAL_SECS);
        let timeout = seconds_from_env("PIX_POLL_TIMEOUT", DEFAULT_POLL_TIMEOUT_SECS);
        let mercadopago = MercadoPagoConfig::new_from_env_or_default();
        let webhook_secret = env::var("PIX_MERCADOPAGO_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Secret::new);
        if webhook_secret.is_none() {
            warn!(
                "🪛️ PIX_MERCADOPAGO_WEBHOOK_SECRET is not set. Webhook signatures will not be checked. Notifications \
                 are only ever used as a hint, but set this in production."
            );
        }
        Self {
            host,
            port,
            database_url,
            use_x_forwarded_for,
            use_forwarded,
            poller: PollerConfig::new(interval, timeout),
            mercadopago,
            webhook_secret,
        }
    }
}

fn seconds_from_env(var: &str, default: u64) -> Duration {
    let secs = env::var(var)
        .map_err(|_| info!("🪛️ {var} is not set. Using the default value of {default}s."))
        .and_then(|s| {
            s.trim()
                .parse::<u64>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}. Using the default of {default}s."))
        })
        .ok()
        .filter(|&s| {
            if s == 0 {
                warn!("🪛️ {var} must be greater than zero. Using the default of {default}s.");
            }
            s > 0
        })
        .unwrap_or(default);
    Duration::from_secs(secs)
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
