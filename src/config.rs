use anyhow::{bail, Context, Result};
use axum::http::HeaderName;
use std::env;

use crate::logging::LogFormat;
use trace_propagation::{HEADER_CAUSATION_ID, HEADER_CORRELATION_ID, HEADER_REQUEST_ID};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

/// Which identifier scheme the server propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    Metadata,
    RequestId,
}

impl SchemeKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "metadata" => Ok(Self::Metadata),
            "request-id" | "request_id" | "requestid" => Ok(Self::RequestId),
            other => bail!("unknown TRACING_SCHEME {other:?}; expected \"metadata\" or \"request-id\""),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::RequestId => "request-id",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingHeaders {
    pub request_id: HeaderName,
    pub causation_id: HeaderName,
    pub correlation_id: HeaderName,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,
    pub log_format: LogFormat,

    // Tracing propagation
    pub scheme: SchemeKind,
    pub headers: TracingHeaders,

    // CORS
    pub cors_allow_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let log_format = match env::var("LOG_FORMAT") {
            Ok(format) => LogFormat::parse(&format)?,
            Err(_) => LogFormat::for_env(&env),
        };

        // Tracing propagation
        let scheme = SchemeKind::parse(
            &env::var("TRACING_SCHEME").unwrap_or_else(|_| "metadata".to_string()),
        )?;
        let headers = TracingHeaders {
            request_id: header_from_env("TRACING_HEADER_REQUEST_ID", &HEADER_REQUEST_ID)?,
            causation_id: header_from_env("TRACING_HEADER_CAUSATION_ID", &HEADER_CAUSATION_ID)?,
            correlation_id: header_from_env(
                "TRACING_HEADER_CORRELATION_ID",
                &HEADER_CORRELATION_ID,
            )?,
        };

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Settings {
            env,
            server_addr,
            log_format,
            scheme,
            headers,
            cors_allow_origins,
        })
    }
}

fn header_from_env(key: &str, default: &HeaderName) -> Result<HeaderName> {
    match env::var(key) {
        Ok(name) => HeaderName::try_from(name.trim())
            .with_context(|| format!("{key} must be a valid HTTP header name, got {name:?}")),
        Err(_) => Ok(default.clone()),
    }
}
