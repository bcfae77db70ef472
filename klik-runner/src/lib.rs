//! Klik Runner: host-side collaborators for the signal pipeline.
//!
//! This crate builds on `klik-core` to provide:
//! - Candle sources (CSV files, deterministic synthetic data)
//! - A parallel polling scanner with cooperative cancellation

pub mod scanner;
pub mod source;

pub use scanner::{ScanError, ScanOutcome, ScanSummary, Scanner, ScannerConfig};
pub use source::{read_csv, write_csv, CandleSource, CsvSource, SourceError, SyntheticSource};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn sources_are_send_sync() {
        assert_send::<CsvSource>();
        assert_sync::<CsvSource>();
        assert_send::<SyntheticSource>();
        assert_sync::<SyntheticSource>();
    }

    #[test]
    fn scanner_is_send_sync() {
        assert_send::<Scanner<SyntheticSource>>();
        assert_sync::<Scanner<SyntheticSource>>();
        assert_send::<ScanOutcome>();
    }
}
