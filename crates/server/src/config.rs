//! Service configuration.
//!
//! All settings come from command-line flags with environment fallbacks.
//! The defaults match the production deployment: listen on
//! `0.0.0.0:8081`, no body ceiling, no extraction timeout.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dom_smoothie::Config as ExtractConfig;

pub const DEFAULT_PORT: u16 = 8081;

/// Log line encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Readability extraction service
#[derive(Parser, Debug, Clone)]
#[command(name = "calo-readability")]
#[command(version)]
#[command(about = "Extract the readable article from POSTed HTML", long_about = None)]
pub struct ServiceConfig {
    /// Address to listen on
    #[arg(long, env = "READABILITY_BIND", default_value = "0.0.0.0", value_name = "ADDR")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "READABILITY_PORT", default_value_t = DEFAULT_PORT, value_name = "PORT")]
    pub port: u16,

    /// Reject request bodies larger than this (default: unbounded)
    #[arg(long, env = "READABILITY_MAX_BODY_BYTES", value_name = "BYTES")]
    pub max_body_bytes: Option<usize>,

    /// Give up on extraction after this many seconds (default: unbounded)
    #[arg(long, env = "READABILITY_EXTRACT_TIMEOUT_SECS", value_name = "SECS")]
    pub extract_timeout_secs: Option<u64>,

    /// Minimum character threshold for content candidates
    #[arg(long, env = "READABILITY_CHAR_THRESHOLD", default_value = "500", value_name = "NUM")]
    pub char_threshold: usize,

    /// Maximum number of top candidates to track
    #[arg(long, env = "READABILITY_MAX_TOP_CANDIDATES", default_value = "5", value_name = "NUM")]
    pub max_top_candidates: usize,

    /// Refuse documents with more elements than this (0 = unlimited)
    #[arg(long, env = "READABILITY_MAX_ELEMENTS", default_value = "0", value_name = "NUM")]
    pub max_elements: usize,

    /// Keep class attributes in output
    #[arg(long, env = "READABILITY_KEEP_CLASSES")]
    pub keep_classes: bool,

    /// Log format (text, json)
    #[arg(long, env = "READABILITY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_body_bytes: None,
            extract_timeout_secs: None,
            char_threshold: 500,
            max_top_candidates: 5,
            max_elements: 0,
            keep_classes: false,
            log_format: LogFormat::Text,
        }
    }
}

impl ServiceConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn extract_timeout(&self) -> Option<Duration> {
        self.extract_timeout_secs.map(Duration::from_secs)
    }

    /// Maps the extraction flags onto the library's configuration.
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            char_threshold: self.char_threshold,
            n_top_candidates: self.max_top_candidates,
            max_elements_to_parse: self.max_elements,
            keep_classes: self.keep_classes,
            ..Default::default()
        }
    }
}
