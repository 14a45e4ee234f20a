pub mod bench;
pub mod clock;
pub mod codec;
pub mod config;
pub mod exporter;
pub mod flush;
pub mod probe;
pub mod view;

pub type Index = usize;
pub type Nanos = u64;

/// One timed read: which slot of the sample buffer was touched and how long it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub index: Index,
    pub duration: Nanos,
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
