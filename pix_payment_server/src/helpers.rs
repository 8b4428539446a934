use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use hmac::{Hmac, Mac};
use log::{debug, trace};
use regex::Regex;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Get the remote IP address from the request. It uses 3 sources to determine the IP address, in decreasing order
/// of preference:
/// 1. The `X-Forwarded-For` header, iif `use_x_forwarded_for` is set to true in the configuration.
/// 2. The `Forwarded` header, iif `use_forwarded` is set to true in the configuration.
/// 3. The peer address from the connection info.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        // The left-most address is the original client
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    if use_forwarded && result.is_none() {
        trace!("Checking Forwarded header");
        result = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| {
                let re = Regex::new(r#"for="?(?P<ip>[^;,"]+)"#).ok()?;
                re.captures(v).and_then(|caps| caps.name("ip")).and_then(|m| IpAddr::from_str(m.as_str()).ok())
            });
        if let Some(ip) = result {
            debug!("Using Forwarded header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.connection_info().peer_addr().map(|a| a.to_string());
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.and_then(|s| IpAddr::from_str(&s).ok())
    })
}

/// The parts of Mercado Pago's `x-signature` header, `ts=<unix time>,v1=<hex hmac>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSignature {
    pub ts: String,
    pub v1: String,
}

impl FromStr for WebhookSignature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ts = None;
        let mut v1 = None;
        for part in s.split(',') {
            match part.split_once('=').map(|(k, v)| (k.trim(), v.trim())) {
                Some(("ts", v)) => ts = Some(v.to_string()),
                Some(("v1", v)) => v1 = Some(v.to_string()),
                _ => {},
            }
        }
        match (ts, v1) {
            (Some(ts), Some(v1)) if !ts.is_empty() && !v1.is_empty() => Ok(Self { ts, v1 }),
            _ => Err(format!("Malformed signature header: {s}")),
        }
    }
}

/// The string Mercado Pago signs: `id:<data.id>;request-id:<x-request-id>;ts:<ts>;`. Parts whose value is unknown
/// are left out. Alphanumeric ids are signed in lower case.
pub fn signature_manifest(data_id: Option<&str>, request_id: Option<&str>, ts: &str) -> String {
    let mut manifest = String::new();
    if let Some(id) = data_id.filter(|s| !s.is_empty()) {
        manifest.push_str(&format!("id:{};", id.to_ascii_lowercase()));
    }
    if let Some(rid) = request_id.filter(|s| !s.is_empty()) {
        manifest.push_str(&format!("request-id:{rid};"));
    }
    manifest.push_str(&format!("ts:{ts};"));
    manifest
}

/// Hex-encoded HMAC-SHA256 of `data`.
pub fn calculate_hmac(secret: &str, data: &[u8]) -> String {
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(data);
            hex::encode(mac.finalize().into_bytes())
        },
        Err(_) => String::default(),
    }
}

/// Checks the signature in constant time.
pub fn verify_signature(secret: &str, signature: &WebhookSignature, data_id: Option<&str>, request_id: Option<&str>) -> bool {
    let Ok(expected) = hex::decode(&signature.v1) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signature_manifest(data_id, request_id, &signature.ts).as_bytes());
    mac.verify_slice(&expected).is_ok()
}
