use std::{net::SocketAddr, time::Duration};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 30;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub token_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("SD_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid SD_LISTEN_ADDR");
        let db_path = std::env::var("SD_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let cors_allow = std::env::var("SD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("SD_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let jwt_secret = match std::env::var("SD_SECRET_KEY") {
            Ok(raw) => decode_secret_key(&raw).expect("Invalid SD_SECRET_KEY"),
            Err(_) => {
                // Random per-process secret: tokens stop working on restart.
                tracing::warn!(
                    "SD_SECRET_KEY is not set; using a random secret, \
                     issued tokens will not survive a restart"
                );
                use rand::RngCore;
                let mut bytes = vec![0u8; 32];
                rand::rngs::OsRng.fill_bytes(&mut bytes);
                bytes
            }
        };
        let token_ttl_secs: u64 = std::env::var("SD_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
        }
    }
}

/// Accepts either a base64-encoded secret or a raw 32-byte ASCII string.
pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_raw_32_byte_ascii_secret() {
        // Not valid base64 (contains '-'), so it is taken verbatim.
        let raw = "local-dev-secret-key-0123456789!";
        assert_eq!(raw.len(), 32);
        let decoded = decode_secret_key(raw).unwrap();
        assert_eq!(decoded, raw.as_bytes());
    }

    #[test]
    fn accepts_base64_secret() {
        let bytes = [7u8; 32];
        let encoded = BASE64.encode(bytes);
        assert_eq!(decode_secret_key(&encoded).unwrap(), bytes.to_vec());
    }

    #[test]
    fn rejects_short_secret() {
        assert!(decode_secret_key("too-short").is_err());
        assert!(decode_secret_key("").is_err());
    }
}
