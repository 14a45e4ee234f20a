use std::{
    process::ExitCode,
    time::{SystemTime, UNIX_EPOCH},
};

use mem_latency::{bench::Bench, config::Config, flush::PlatformCacheController, init_tracing};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};

fn main() -> ExitCode {
    init_tracing();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let rng = StdRng::seed_from_u64(seed);

    let config = Config::from_env();
    info!(
        out_file = %config.out_file.display(),
        bytes = config.data_size_bytes,
        runs = config.runs,
        "Starting"
    );
    let mut bench = Bench::new(config, PlatformCacheController::default(), rng);
    match bench.execute() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
