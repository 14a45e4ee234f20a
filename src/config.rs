use std::path::PathBuf;

pub const OUT_FILE: &str = "output.csv";
pub const SCATTER_FILE: &str = "memory-scatterplot.html";
pub const RUNS: usize = 1;
pub const DATA_SIZE_BYTES: usize = 1_000_000;
pub const INT_COUNT: usize = DATA_SIZE_BYTES / core::mem::size_of::<i32>();

/// Overrides [`OUT_FILE`].
pub const OUTPUT_ENV: &str = "MEM_LATENCY_OUTPUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub out_file: PathBuf,
    pub data_size_bytes: usize,
    pub runs: usize,
    pub accesses_per_run: usize,
}
impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(OUTPUT_ENV).filter(|p| !p.is_empty()) {
            config.out_file = path.into();
        }
        config
    }
}
impl Default for Config {
    fn default() -> Self {
        Self {
            out_file: OUT_FILE.into(),
            data_size_bytes: DATA_SIZE_BYTES,
            runs: RUNS,
            accesses_per_run: INT_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.out_file, PathBuf::from("output.csv"));
        assert_eq!(config.runs, 1);
        assert_eq!(INT_COUNT, 250_000);
        assert_eq!(config.accesses_per_run, INT_COUNT);
    }
}
