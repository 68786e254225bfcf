//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use aegis_core::DEFAULT_MATCH_THRESHOLD;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 50)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 10)
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Postgres connection string (enables persistence when set)
    pub database_url: Option<String>,
    /// Database connection pool maximum connections (default: 20)
    pub database_max_connections: u32,
    /// Database connection pool minimum connections (default: 2)
    pub database_min_connections: u32,
    /// HS256 signing secret (enables token issuance when set)
    pub token_secret: Option<String>,
    /// Token lifetime in minutes (default: 60)
    pub token_ttl_minutes: i64,
    /// Greatest descriptor distance still accepted as a match (default: 0.6)
    pub match_threshold: f64,
    /// Path to the dlib 68-point landmark model file
    pub landmark_model: PathBuf,
    /// Path to the dlib ResNet encoder model file
    pub encoder_model: PathBuf,
    /// Directory where enrollment face crops are written
    pub crop_dir: PathBuf,
    /// Allow the mock oracle when model files are absent (default: false, enable with ALLOW_MOCK_ORACLE=true)
    pub allow_mock_oracle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 50,
            max_file_size_mb: 10,
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            database_url: None,
            database_max_connections: 20,
            database_min_connections: 2,
            token_secret: None,
            token_ttl_minutes: 60,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            landmark_model: PathBuf::from("models/shape_predictor_68_face_landmarks.dat"),
            encoder_model: PathBuf::from("models/dlib_face_recognition_resnet_model_v1.dat"),
            crop_dir: PathBuf::from("face_crops"),
            allow_mock_oracle: true, // Enabled by default for tests; from_env() defaults to false
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| parse_host(&h))
            .unwrap_or([127, 0, 0, 1]);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        let body_limit_mb = std::env::var("BODY_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        let max_file_size_mb = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let rate_limit_per_sec = std::env::var("RATE_LIMIT_PER_SECOND")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let rate_limit_burst = std::env::var("RATE_LIMIT_BURST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let database_url = std::env::var("DATABASE_URL").ok();

        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        let database_min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let token_secret = std::env::var("TOKEN_SECRET").ok().filter(|s| !s.is_empty());

        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let match_threshold = std::env::var("FACE_MATCH_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MATCH_THRESHOLD);

        let landmark_model = std::env::var("FACE_LANDMARK_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models/shape_predictor_68_face_landmarks.dat"));

        let encoder_model = std::env::var("FACE_ENCODER_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models/dlib_face_recognition_resnet_model_v1.dat"));

        let crop_dir = std::env::var("FACE_CROP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("face_crops"));

        let allow_mock_oracle = std::env::var("ALLOW_MOCK_ORACLE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            port,
            host,
            allowed_origins,
            body_limit_mb,
            max_file_size_mb,
            timeout_secs,
            rate_limit_enabled,
            rate_limit_per_sec,
            rate_limit_burst,
            database_url,
            database_max_connections,
            database_min_connections,
            token_secret,
            token_ttl_minutes,
            match_threshold,
            landmark_model,
            encoder_model,
            crop_dir,
            allow_mock_oracle,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

/// Parse a dotted-quad host string, falling back to loopback on anything else.
fn parse_host(host: &str) -> [u8; 4] {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');
    for octet in octets.iter_mut() {
        let Some(part) = parts.next() else {
            return [127, 0, 0, 1];
        };
        let Ok(value) = part.parse() else {
            return [127, 0, 0, 1];
        };
        *octet = value;
    }
    if parts.next().is_some() {
        return [127, 0, 0, 1];
    }
    octets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_any() {
        assert_eq!(parse_host("0.0.0.0"), [0, 0, 0, 0]);
    }

    #[test]
    fn test_parse_host_dotted_quad() {
        assert_eq!(parse_host("192.168.1.10"), [192, 168, 1, 10]);
    }

    #[test]
    fn test_parse_host_invalid_falls_back_to_loopback() {
        assert_eq!(parse_host("localhost"), [127, 0, 0, 1]);
        assert_eq!(parse_host("10.0.0"), [127, 0, 0, 1]);
        assert_eq!(parse_host("1.2.3.4.5"), [127, 0, 0, 1]);
        assert_eq!(parse_host("1.2.3.999"), [127, 0, 0, 1]);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.token_secret.is_none());
        assert!(config.allow_mock_oracle);
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            host: [0, 0, 0, 0],
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }
}
