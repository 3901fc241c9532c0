//! Experiment records and views over the loaded result set.

use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use csv::ReaderBuilder;
use itertools::Itertools;
use log::debug;
use serde::Deserialize;

/// One row of the experiment results file: a single run of the measured
/// system with a fixed dataset size and worker count.
#[derive(Clone, Debug, Deserialize)]
pub struct ExperimentRecord {
    /// Number of datagrams in the processed dataset.
    pub datagram_count: u64,
    /// Number of workers, 0 means a local run without distribution.
    pub workers: u32,
    /// Total processing time.
    pub total_time_ms: f64,
    /// Processed datagrams per second.
    pub throughput_dps: f64,
    /// Average vehicle speed computed by the run.
    pub avg_speed_kmh: f64,
    /// Time spent in the load phase.
    pub load_time_ms: f64,
    /// Time spent in the separation phase.
    pub separation_time_ms: f64,
    /// Time spent in the distribution phase.
    pub distribution_time_ms: f64,
    /// Time spent in the consolidation phase.
    pub consolidation_time_ms: f64,
}

impl ExperimentRecord {
    /// The four pipeline phases in execution order with their durations.
    pub fn phase_times(&self) -> [(&'static str, f64); 4] {
        [
            ("Load", self.load_time_ms),
            ("Separation", self.separation_time_ms),
            ("Distribution", self.distribution_time_ms),
            ("Consolidation", self.consolidation_time_ms),
        ]
    }

    /// Sum of the four phase durations.
    pub fn phase_total_ms(&self) -> f64 {
        self.load_time_ms + self.separation_time_ms + self.distribution_time_ms + self.consolidation_time_ms
    }
}

/// Set of experiment records loaded from a results file.
#[derive(Clone, Debug, Default)]
pub struct Results {
    pub records: Vec<ExperimentRecord>,
}

impl Results {
    /// Read records from a CSV file with headers. Panics on error.
    pub fn from_csv<P: AsRef<Path>>(file: P) -> Self {
        Self::from_reader(
            File::open(&file).unwrap_or_else(|_| panic!("Can't read file {}", file.as_ref().display())),
        )
    }

    /// Read records from any CSV source with headers. Panics on error.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let records = ReaderBuilder::new()
            .from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<ExperimentRecord>, _>>()
            .unwrap_or_else(|e| panic!("Can't parse experiment results: {}", e));
        Self { records }
    }

    /// Distinct dataset sizes in ascending order.
    pub fn sizes(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.datagram_count).sorted().dedup().collect()
    }

    /// Distinct worker counts in ascending order.
    pub fn worker_counts(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.workers).sorted().dedup().collect()
    }

    /// Records grouped by dataset size, each group sorted by worker count
    /// ascending. The sort is stable, so duplicates of a (size, workers)
    /// pair keep their input order.
    pub fn by_size(&self) -> BTreeMap<u64, Vec<&ExperimentRecord>> {
        let mut groups: BTreeMap<u64, Vec<&ExperimentRecord>> = BTreeMap::new();
        for record in self.records.iter() {
            groups.entry(record.datagram_count).or_default().push(record);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|record| record.workers);
        }
        groups
    }

    /// Records grouped by worker count, each group sorted by dataset size
    /// ascending.
    pub fn by_workers(&self) -> BTreeMap<u32, Vec<&ExperimentRecord>> {
        let mut groups: BTreeMap<u32, Vec<&ExperimentRecord>> = BTreeMap::new();
        for record in self.records.iter() {
            groups.entry(record.workers).or_default().push(record);
        }
        for group in groups.values_mut() {
            group.sort_by_key(|record| record.datagram_count);
        }
        groups
    }

    /// The most recent record for every (size, workers) pair.
    pub fn latest_by_config(&self) -> BTreeMap<(u64, u32), &ExperimentRecord> {
        let mut latest: BTreeMap<(u64, u32), &ExperimentRecord> = BTreeMap::new();
        for record in self.records.iter() {
            if latest.insert((record.datagram_count, record.workers), record).is_some() {
                debug!(
                    "duplicate configuration ({} datagrams, {} workers), keeping the most recent record",
                    record.datagram_count, record.workers
                );
            }
        }
        latest
    }
}
