use humlab_synth::DEFAULT_SYNTHESIS_TIMEOUT;

/// Blob store backend selection.
#[derive(Debug, Clone)]
pub enum BlobBackendConfig {
    /// Files under a base directory, served back by this process at
    /// `/blobs`.
    Local { base_dir: String, url_base: String },
    /// An S3 (or S3-compatible) bucket with a public retrieval base URL.
    S3 {
        bucket: String,
        public_url_base: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace given to background tasks at shutdown (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// How long unpromoted artifacts and uploads live (default: `12` hours).
    pub retention_hours: i64,
    /// How often the reclamation sweeper runs (default: every 12 hours).
    pub sweep_period_secs: u64,
    /// Wall-clock bound on one synthesis invocation (default: `60`).
    pub synthesis_timeout_secs: u64,
    /// Synthesis engine command, whitespace-split from `SYNTH_COMMAND`.
    pub synth_command: Vec<String>,
    /// Blob store backend.
    pub blob_backend: BlobBackendConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                        |
    /// |--------------------------|--------------------------------|
    /// | `HOST`                   | `0.0.0.0`                      |
    /// | `PORT`                   | `3000`                         |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `5`                            |
    /// | `RETENTION_HOURS`        | `12`                           |
    /// | `SWEEP_PERIOD_SECS`      | `43200`                        |
    /// | `SYNTHESIS_TIMEOUT_SECS` | `60`                           |
    /// | `SYNTH_COMMAND`          | `synth-engine`                 |
    /// | `BLOB_BACKEND`           | `local`                        |
    /// | `BLOB_DIR`               | `./blobs` (local backend)      |
    /// | `BLOB_URL_BASE`          | `http://localhost:3000/blobs`  |
    /// | `S3_BUCKET`              | required for `s3` backend      |
    /// | `S3_PUBLIC_URL_BASE`     | required for `s3` backend      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let retention_hours: i64 = std::env::var("RETENTION_HOURS")
            .unwrap_or_else(|_| "12".into())
            .parse()
            .expect("RETENTION_HOURS must be a valid i64");

        let sweep_period_secs: u64 = std::env::var("SWEEP_PERIOD_SECS")
            .unwrap_or_else(|_| "43200".into())
            .parse()
            .expect("SWEEP_PERIOD_SECS must be a valid u64");

        let synthesis_timeout_secs: u64 = std::env::var("SYNTHESIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_SYNTHESIS_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("SYNTHESIS_TIMEOUT_SECS must be a valid u64");

        let synth_command: Vec<String> = std::env::var("SYNTH_COMMAND")
            .unwrap_or_else(|_| "synth-engine".into())
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert!(
            !synth_command.is_empty(),
            "SYNTH_COMMAND must name a program"
        );

        let blob_backend = match std::env::var("BLOB_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "local" => BlobBackendConfig::Local {
                base_dir: std::env::var("BLOB_DIR").unwrap_or_else(|_| "./blobs".into()),
                url_base: std::env::var("BLOB_URL_BASE")
                    .unwrap_or_else(|_| "http://localhost:3000/blobs".into()),
            },
            "s3" => BlobBackendConfig::S3 {
                bucket: std::env::var("S3_BUCKET").expect("S3_BUCKET must be set for s3 backend"),
                public_url_base: std::env::var("S3_PUBLIC_URL_BASE")
                    .expect("S3_PUBLIC_URL_BASE must be set for s3 backend"),
            },
            other => panic!("Unknown BLOB_BACKEND '{other}'. Must be one of: local, s3"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            retention_hours,
            sweep_period_secs,
            synthesis_timeout_secs,
            synth_command,
            blob_backend,
        }
    }
}
