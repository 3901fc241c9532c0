use mio_scaling::{
    metrics::{cutoff_analysis, efficiency, speedup_by_size, Benefit},
    record::{ExperimentRecord, Results},
    report::{render_report, thousands},
};

fn record(datagram_count: u64, workers: u32, total_time_ms: f64) -> ExperimentRecord {
    ExperimentRecord {
        datagram_count,
        workers,
        total_time_ms,
        throughput_dps: datagram_count as f64 / (total_time_ms / 1000.0),
        avg_speed_kmh: 23.5,
        load_time_ms: total_time_ms * 0.4,
        separation_time_ms: total_time_ms * 0.1,
        distribution_time_ms: total_time_ms * 0.3,
        consolidation_time_ms: total_time_ms * 0.2,
    }
}

fn results(records: Vec<ExperimentRecord>) -> Results {
    Results { records }
}

#[test]
fn baseline_speedup_is_one() {
    let results = results(vec![
        record(1000, 0, 1000.0),
        record(1000, 4, 250.0),
        record(5000, 8, 300.0),
        record(5000, 2, 800.0),
    ]);
    for analysis in cutoff_analysis(&results) {
        assert_eq!(analysis.configs[0].speedup, 1.0);
    }
}

#[test]
fn efficiency_follows_convention() {
    assert_eq!(efficiency(4.0, 0), 0.0);
    assert_eq!(efficiency(4.0, 4), 100.0);
    assert!((efficiency(1.5, 3) - 50.0).abs() < 1e-9);
}

#[test]
fn benefit_classification_is_monotonic() {
    assert_eq!(Benefit::classify(1.3), Benefit::Beneficial);
    assert_eq!(Benefit::classify(1.05), Benefit::Marginal);
    assert_eq!(Benefit::classify(0.9), Benefit::NotBeneficial);
    // Threshold boundaries.
    assert_eq!(Benefit::classify(1.1), Benefit::Marginal);
    assert_eq!(Benefit::classify(1.0), Benefit::NotBeneficial);
}

#[test]
fn four_workers_quartering_time_give_speedup_four() {
    let results = results(vec![record(1000, 0, 1000.0), record(1000, 4, 250.0)]);
    let analysis = cutoff_analysis(&results);
    assert_eq!(analysis.len(), 1);
    let distributed = &analysis[0].configs[1];
    assert_eq!(distributed.workers, 4);
    assert!((distributed.speedup - 4.0).abs() < 1e-9);
    assert!((distributed.efficiency - 100.0).abs() < 1e-9);
    assert_eq!(distributed.benefit, Benefit::Beneficial);
}

#[test]
fn phase_times_decompose_phase_total() {
    let record = record(1000, 4, 250.0);
    let stacked: f64 = record.phase_times().iter().map(|&(_name, time)| time).sum();
    assert_eq!(stacked, record.phase_total_ms());
    let columns = record.load_time_ms
        + record.separation_time_ms
        + record.distribution_time_ms
        + record.consolidation_time_ms;
    assert_eq!(stacked, columns);
}

#[test]
fn baseline_without_local_run_is_minimum_workers() {
    let results = results(vec![record(2000, 4, 450.0), record(2000, 2, 900.0)]);
    let analysis = cutoff_analysis(&results);
    assert_eq!(analysis[0].configs[0].workers, 2);
    assert_eq!(analysis[0].configs[0].speedup, 1.0);
    assert!((analysis[0].configs[1].speedup - 2.0).abs() < 1e-9);
}

#[test]
fn single_record_sizes_are_skipped_by_cutoff_analysis() {
    let results = results(vec![
        record(1000, 0, 1000.0),
        record(1000, 4, 250.0),
        record(9999, 0, 123.0),
    ]);
    let analysis = cutoff_analysis(&results);
    assert_eq!(analysis.len(), 1);
    assert_eq!(analysis[0].datagram_count, 1000);
    // The speedup chart still gets a series for the lone size.
    assert_eq!(speedup_by_size(&results).len(), 2);
}

#[test]
fn latest_record_wins_for_duplicate_configs() {
    let results = results(vec![
        record(1000, 4, 300.0),
        record(1000, 0, 1000.0),
        record(1000, 4, 250.0),
    ]);
    let latest = results.latest_by_config();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[&(1000, 4)].total_time_ms, 250.0);
}

#[test]
fn distinct_values_are_sorted() {
    let results = results(vec![
        record(5000, 8, 300.0),
        record(1000, 0, 1000.0),
        record(5000, 0, 2000.0),
        record(1000, 8, 200.0),
    ]);
    assert_eq!(results.sizes(), vec![1000, 5000]);
    assert_eq!(results.worker_counts(), vec![0, 8]);
}

#[test]
fn report_has_one_block_per_size_with_workers_ascending() {
    let results = results(vec![
        record(2000, 4, 500.0),
        record(1000, 2, 700.0),
        record(2000, 0, 1500.0),
    ]);
    let report = render_report(&results);

    assert_eq!(report.matches("Tamaño:").count(), 2);
    assert_eq!(report.matches("Total de experimentos: 3").count(), 1);

    let small = report.find("Tamaño: 1,000 datagramas").unwrap();
    let large = report.find("Tamaño: 2,000 datagramas").unwrap();
    assert!(small < large);

    let local = report.find("Workers: 0").unwrap();
    let four = report.find("Workers: 4").unwrap();
    assert!(large < local && local < four);
}

#[test]
fn thousands_separators() {
    assert_eq!(thousands(123), "123");
    assert_eq!(thousands(1000), "1,000");
    assert_eq!(thousands(1234567), "1,234,567");
}

#[test]
fn records_parse_from_csv() {
    let csv = "\
datagram_count,workers,total_time_ms,throughput_dps,avg_speed_kmh,load_time_ms,separation_time_ms,distribution_time_ms,consolidation_time_ms
1000,0,1000.0,1000.0,23.50,400.0,100.0,300.0,200.0
1000,4,250.0,4000.0,23.50,100.0,25.0,75.0,50.0
";
    let results = Results::from_reader(csv.as_bytes());
    assert_eq!(results.records.len(), 2);
    assert_eq!(results.records[0].datagram_count, 1000);
    assert_eq!(results.records[0].workers, 0);
    assert_eq!(results.records[1].workers, 4);
    assert_eq!(results.records[1].total_time_ms, 250.0);
    assert_eq!(results.records[1].consolidation_time_ms, 50.0);
}

#[test]
#[should_panic(expected = "Can't read file")]
fn missing_results_file_is_fatal() {
    Results::from_csv("definitely_missing_results.csv");
}
