use log::*;
use pix_common::Secret;

pub const DEFAULT_MERCADOPAGO_BASE_URL: &str = "https://api.mercadopago.com";

#[derive(Debug, Clone, Default)]
pub struct MercadoPagoConfig {
    pub base_url: String,
    pub access_token: Secret<String>,
    /// Passed to Mercado Pago on every new charge so that it knows where to push status notifications.
    pub notification_url: Option<String>,
}

impl MercadoPagoConfig {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: Secret::new(access_token.to_string()),
            notification_url: None,
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("PIX_MERCADOPAGO_BASE_URL").unwrap_or_else(|_| {
            info!("💳️ PIX_MERCADOPAGO_BASE_URL not set, using {DEFAULT_MERCADOPAGO_BASE_URL}");
            DEFAULT_MERCADOPAGO_BASE_URL.to_string()
        });
        let access_token = std::env::var("PIX_MERCADOPAGO_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("💳️ PIX_MERCADOPAGO_ACCESS_TOKEN not set. Every call to Mercado Pago will fail until it is.");
            String::default()
        });
        let notification_url =
            std::env::var("PIX_MERCADOPAGO_NOTIFICATION_URL").ok().filter(|s| !s.trim().is_empty());
        if notification_url.is_none() {
            warn!("💳️ PIX_MERCADOPAGO_NOTIFICATION_URL not set. Payment status will only be tracked by polling.");
        }
        let mut config = Self::new(&base_url, &access_token);
        config.notification_url = notification_url;
        config
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.reveal().trim().is_empty()
    }
}
