//! Derived scalability metrics: speedup, efficiency and the benefit
//! classification used by the cutoff-point analysis.

use std::fmt;

use crate::record::Results;

/// Speedup above which distribution clearly pays off.
pub const BENEFICIAL_SPEEDUP: f64 = 1.1;
/// Speedup above which distribution at least breaks even.
pub const MARGINAL_SPEEDUP: f64 = 1.0;

/// Whether a configuration is worth running distributed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Benefit {
    Beneficial,
    Marginal,
    NotBeneficial,
}

impl Benefit {
    /// Classify a configuration by its speedup against the baseline.
    pub fn classify(speedup: f64) -> Self {
        if speedup > BENEFICIAL_SPEEDUP {
            Benefit::Beneficial
        } else if speedup > MARGINAL_SPEEDUP {
            Benefit::Marginal
        } else {
            Benefit::NotBeneficial
        }
    }
}

impl fmt::Display for Benefit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Benefit::Beneficial => write!(f, "BENEFICIAL"),
            Benefit::Marginal => write!(f, "MARGINAL"),
            Benefit::NotBeneficial => write!(f, "NOT BENEFICIAL"),
        }
    }
}

/// Ratio of the baseline time to a configuration's time.
pub fn speedup(baseline_time_ms: f64, time_ms: f64) -> f64 {
    baseline_time_ms / time_ms
}

/// Speedup normalized by the number of workers, in percent. A local run
/// has no workers to normalize by and reports 0 by convention.
pub fn efficiency(speedup: f64, workers: u32) -> f64 {
    if workers > 0 {
        speedup / workers as f64 * 100.0
    } else {
        0.0
    }
}

/// Derived metrics of one worker configuration against its baseline.
#[derive(Clone, Debug)]
pub struct ConfigMetrics {
    pub workers: u32,
    pub total_time_ms: f64,
    pub speedup: f64,
    pub efficiency: f64,
    pub benefit: Benefit,
}

/// Cutoff-point analysis of one dataset size.
#[derive(Clone, Debug)]
pub struct SizeAnalysis {
    pub datagram_count: u64,
    pub configs: Vec<ConfigMetrics>,
}

/// Speedup series per dataset size, workers ascending within a size.
/// The baseline is the record with the minimum worker count for that
/// size, which is not necessarily a local run.
pub fn speedup_by_size(results: &Results) -> Vec<(u64, Vec<(u32, f64)>)> {
    results
        .by_size()
        .into_iter()
        .map(|(size, records)| {
            let baseline_time = records[0].total_time_ms;
            let series = records
                .iter()
                .map(|record| (record.workers, speedup(baseline_time, record.total_time_ms)))
                .collect();
            (size, series)
        })
        .collect()
}

/// Compare every configuration of a dataset size against its
/// minimum-worker baseline. Sizes with a single record are skipped since
/// there is nothing to compare against.
pub fn cutoff_analysis(results: &Results) -> Vec<SizeAnalysis> {
    results
        .by_size()
        .into_iter()
        .filter(|(_size, records)| records.len() >= 2)
        .map(|(size, records)| {
            let baseline_time = records[0].total_time_ms;
            SizeAnalysis {
                datagram_count: size,
                configs: records
                    .iter()
                    .map(|record| {
                        let speedup = speedup(baseline_time, record.total_time_ms);
                        ConfigMetrics {
                            workers: record.workers,
                            total_time_ms: record.total_time_ms,
                            speedup,
                            efficiency: efficiency(speedup, record.workers),
                            benefit: Benefit::classify(speedup),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}
