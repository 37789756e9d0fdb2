use clap::Parser;
use std::net::SocketAddr;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Ocean sensor log service
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ocean-service",
    about = "HTTP service that extracts water-quality observations from sensor logs",
    version
)]
pub struct ServiceConfig {
    /// Address to listen on
    #[arg(long, env = "OCEAN_BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind_addr: SocketAddr,

    /// Maximum upload size in megabytes (1-4096)
    #[arg(
        long,
        env = "OCEAN_BODY_LIMIT_MB",
        default_value = "64",
        value_parser = clap::value_parser!(u64).range(1..=4096)
    )]
    pub body_limit_mb: u64,
}

impl ServiceConfig {
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb
            .checked_mul(BYTES_PER_MB)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .unwrap_or(usize::MAX)
    }
}
