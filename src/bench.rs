use rand::Rng;
use tracing::{error, info};

use crate::{
    clock::now_ns,
    config::Config,
    exporter::CsvExporter,
    flush::{flush_region, CacheController},
    probe::{self, SampleBuffer},
};

/// Drives every run of one invocation: flush, probe, export.
#[derive(Debug)]
pub struct Bench<C, R> {
    config: Config,
    controller: C,
    rng: R,
    exporter: CsvExporter,
}
impl<C, R> Bench<C, R>
where
    C: CacheController,
    R: Rng,
{
    pub fn new(config: Config, controller: C, rng: R) -> Self {
        let exporter = CsvExporter::new(config.out_file.clone());
        Self {
            config,
            controller,
            rng,
            exporter,
        }
    }

    /// Returns how many runs reached the output file.
    ///
    /// Only allocation failures are returned as errors; output failures are
    /// logged and the affected run is skipped.
    pub fn execute(&mut self) -> anyhow::Result<usize> {
        let buffer = SampleBuffer::with_byte_budget(self.config.data_size_bytes)?;

        if let Err(e) = self.exporter.init() {
            error!("{e:#}");
        }

        let mut exported = 0;
        for run in 0..self.config.runs {
            flush_region(&self.controller, buffer.as_slice());

            let start = now_ns();
            let records = probe::run(
                buffer.as_slice(),
                self.config.accesses_per_run,
                &mut self.rng,
            )?;
            info!(
                run,
                accesses = records.len(),
                elapsed_ms = now_ns().saturating_sub(start) / 1_000_000,
                "Run complete"
            );

            match self.exporter.export(&records) {
                Ok(()) => exported += 1,
                Err(e) => error!(run, "{e:#}"),
            }
        }
        Ok(exported)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        codec::{decode_record, HEADER},
        exporter::tests::temp_path,
        flush::NoopCacheController,
    };

    fn config(path: std::path::PathBuf, data_size_bytes: usize, runs: usize) -> Config {
        Config {
            out_file: path,
            data_size_bytes,
            runs,
            accesses_per_run: data_size_bytes / 4,
        }
    }

    #[test]
    fn default_sized_run_writes_one_line_per_access() {
        let path = temp_path("full.csv");
        let config = config(path.clone(), 1_000_000, 1);
        let mut bench = Bench::new(config, NoopCacheController, StdRng::seed_from_u64(11));
        assert_eq!(bench.execute().unwrap(), 1);

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(HEADER));
        let mut rows = 0;
        for line in lines {
            let record = decode_record(line).unwrap();
            assert!(record.index < 250_000);
            rows += 1;
        }
        assert_eq!(rows, 250_000);
    }

    #[test]
    fn runs_share_one_header() {
        let path = temp_path("multi.csv");
        let mut bench = Bench::new(
            config(path.clone(), 400, 3),
            NoopCacheController,
            StdRng::seed_from_u64(5),
        );
        assert_eq!(bench.execute().unwrap(), 3);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1 + 3 * 100);
        assert_eq!(text.lines().filter(|l| *l == HEADER).count(), 1);
    }

    #[test]
    fn new_invocation_overwrites() {
        let path = temp_path("rerun.csv");
        for seed in 0..2 {
            let mut bench = Bench::new(
                config(path.clone(), 40, 1),
                NoopCacheController,
                StdRng::seed_from_u64(seed),
            );
            bench.execute().unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 11);
    }

    #[test]
    fn unwritable_output_is_skipped() {
        let path = temp_path("no-such-dir").join("deeper").join("out.csv");
        let mut bench = Bench::new(
            config(path.clone(), 40, 2),
            NoopCacheController,
            StdRng::seed_from_u64(1),
        );
        assert_eq!(bench.execute().unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn record_allocation_failure_is_fatal() {
        let path = temp_path("fatal.csv");
        let mut config = config(path, 40, 1);
        config.accesses_per_run = usize::MAX;
        let mut bench = Bench::new(config, NoopCacheController, StdRng::seed_from_u64(1));
        assert!(bench.execute().is_err());
    }
}
