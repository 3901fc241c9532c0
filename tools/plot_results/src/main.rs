use std::{collections::BTreeMap, fs::File, io::Write, path::PathBuf};

use clap::Parser;
use env_logger::Builder;
use mio_scaling::{
    metrics::{cutoff_analysis, speedup_by_size},
    record::{ExperimentRecord, Results},
    report::{render_report, thousands},
};
use plotters::{
    backend::BitMapBackend,
    chart::{ChartBuilder, SeriesLabelPosition},
    coord::combinators::IntoLogRange,
    drawing::IntoDrawingArea,
    element::Rectangle,
    series::{DashedLineSeries, LineSeries},
    style::{Color, RGBColor, ShapeStyle, BLACK, BLUE, WHITE},
};

/// Draws charts and an analysis report from experiment results.
#[derive(Parser, Debug)]
struct Args {
    /// Path to the experiment results CSV.
    #[arg(short, long, default_value = "experiment_results.csv")]
    input: PathBuf,

    /// Path to the output folder with charts and the report.
    #[arg(short, long, default_value = "experiment_results")]
    output: PathBuf,

    /// Width of a chart in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Height of a chart in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Stroke width.
    #[arg(long, default_value_t = 2)]
    stroke_width: u32,

    /// Font size.
    #[arg(long, default_value_t = 25)]
    font_size: u32,
}

const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(243, 156, 18),
    RGBColor(155, 89, 182),
    RGBColor(52, 73, 94),
];

const PHASE_COLORS: [RGBColor; 4] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(243, 156, 18),
];

fn series_color(index: usize) -> RGBColor {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

fn line_style(args: &Args, color: RGBColor) -> ShapeStyle {
    ShapeStyle {
        color: color.into(),
        filled: false,
        stroke_width: args.stroke_width,
    }
}

fn draw_time_vs_size(args: &Args, results: &Results) {
    let path = args.output.join("plots").join("time_vs_size.png");
    let root = BitMapBackend::new(&path, (args.width, args.height)).into_drawing_area();
    let _ = root.fill(&WHITE);

    let x_min = results.records.iter().map(|r| r.datagram_count as f64).fold(f64::MAX, f64::min);
    let x_max = results.records.iter().map(|r| r.datagram_count as f64).fold(0.0f64, f64::max);
    let y_min = results.records.iter().map(|r| r.total_time_ms / 1000.0).fold(f64::MAX, f64::min);
    let y_max = results.records.iter().map(|r| r.total_time_ms / 1000.0).fold(0.0f64, f64::max);

    let root = root.margin(20, 20, 20, 20);
    let mut chart = ChartBuilder::on(&root)
        .caption("Processing time vs dataset size", ("sans-serif", args.font_size + 5, &BLACK))
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(
            (x_min * 0.9..x_max * 1.1).log_scale(),
            (y_min * 0.9..y_max * 1.1).log_scale(),
        )
        .unwrap();

    chart
        .configure_mesh()
        .x_desc("Dataset size (datagrams)")
        .y_desc("Processing time (seconds)")
        .axis_desc_style(("sans-serif", args.font_size, &BLACK))
        .x_label_formatter(&|x: &f64| thousands(x.round() as u64))
        .x_label_style(("sans-serif", args.font_size, &BLACK))
        .y_label_style(("sans-serif", args.font_size, &BLACK))
        .draw()
        .unwrap();

    for (i, (workers, records)) in results.by_workers().into_iter().enumerate() {
        let color = series_color(i);
        let name = if workers > 0 {
            format!("{} workers", workers)
        } else {
            "Local (no workers)".to_string()
        };
        chart
            .draw_series(
                LineSeries::new(
                    records.iter().map(|r| (r.datagram_count as f64, r.total_time_ms / 1000.0)),
                    line_style(args, color),
                )
                .point_size(4),
            )
            .unwrap()
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x - 10, y + 2), (x + 10, y - 2)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", args.font_size, &BLACK))
        .margin(20)
        .legend_area_size(25)
        .border_style(BLUE)
        .background_style(BLUE.mix(0.1))
        .draw()
        .unwrap();
    root.present().unwrap();
    println!("Chart saved to {}", path.display());
}

fn draw_speedup(args: &Args, results: &Results) {
    let path = args.output.join("plots").join("speedup.png");
    let root = BitMapBackend::new(&path, (args.width, args.height)).into_drawing_area();
    let _ = root.fill(&WHITE);

    let series = speedup_by_size(results);
    let max_workers = *results.worker_counts().last().unwrap();
    let max_speedup = series
        .iter()
        .flat_map(|(_size, points)| points.iter().map(|&(_workers, speedup)| speedup))
        .fold(max_workers as f64, f64::max)
        .max(1.0);

    let root = root.margin(20, 20, 20, 20);
    let mut chart = ChartBuilder::on(&root)
        .caption("Speedup vs number of workers", ("sans-serif", args.font_size + 5, &BLACK))
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..max_workers as f64 + 0.5, 0.0..max_speedup * 1.1)
        .unwrap();

    chart
        .configure_mesh()
        .x_desc("Number of workers")
        .y_desc("Speedup (baseline time / configuration time)")
        .axis_desc_style(("sans-serif", args.font_size, &BLACK))
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .x_label_style(("sans-serif", args.font_size, &BLACK))
        .y_label_style(("sans-serif", args.font_size, &BLACK))
        .draw()
        .unwrap();

    for (i, (size, points)) in series.into_iter().enumerate() {
        let color = series_color(i);
        chart
            .draw_series(
                LineSeries::new(
                    points.into_iter().map(|(workers, speedup)| (workers as f64, speedup)),
                    line_style(args, color),
                )
                .point_size(4),
            )
            .unwrap()
            .label(format!("{} datagrams", thousands(size)))
            .legend(move |(x, y)| Rectangle::new([(x - 10, y + 2), (x + 10, y - 2)], color.filled()));
    }

    if max_workers > 0 {
        chart
            .draw_series(DashedLineSeries::new(
                [(0.0, 1.0), (max_workers as f64, max_workers as f64)],
                8,
                6,
                ShapeStyle {
                    color: BLACK.mix(0.5),
                    filled: false,
                    stroke_width: args.stroke_width,
                },
            ))
            .unwrap()
            .label("Ideal (linear) speedup")
            .legend(move |(x, y)| Rectangle::new([(x - 10, y + 2), (x + 10, y - 2)], BLACK.mix(0.5).filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", args.font_size, &BLACK))
        .margin(20)
        .legend_area_size(25)
        .border_style(BLUE)
        .background_style(BLUE.mix(0.1))
        .draw()
        .unwrap();
    root.present().unwrap();
    println!("Chart saved to {}", path.display());
}

fn draw_throughput(args: &Args, results: &Results) {
    let path = args.output.join("plots").join("throughput.png");
    let root = BitMapBackend::new(&path, (args.width, args.height)).into_drawing_area();
    let _ = root.fill(&WHITE);

    let max_workers = *results.worker_counts().last().unwrap();
    let max_throughput = results
        .records
        .iter()
        .map(|r| r.throughput_dps / 1000.0)
        .fold(0.0f64, f64::max);

    let root = root.margin(20, 20, 20, 20);
    let mut chart = ChartBuilder::on(&root)
        .caption("Throughput vs number of workers", ("sans-serif", args.font_size + 5, &BLACK))
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..max_workers as f64 + 0.5, 0.0..max_throughput * 1.1)
        .unwrap();

    chart
        .configure_mesh()
        .x_desc("Number of workers")
        .y_desc("Throughput (thousands of datagrams/second)")
        .axis_desc_style(("sans-serif", args.font_size, &BLACK))
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .x_label_style(("sans-serif", args.font_size, &BLACK))
        .y_label_style(("sans-serif", args.font_size, &BLACK))
        .draw()
        .unwrap();

    for (i, (size, records)) in results.by_size().into_iter().enumerate() {
        let color = series_color(i);
        chart
            .draw_series(
                LineSeries::new(
                    records.iter().map(|r| (r.workers as f64, r.throughput_dps / 1000.0)),
                    line_style(args, color),
                )
                .point_size(4),
            )
            .unwrap()
            .label(format!("{} datagrams", thousands(size)))
            .legend(move |(x, y)| Rectangle::new([(x - 10, y + 2), (x + 10, y - 2)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", args.font_size, &BLACK))
        .margin(20)
        .legend_area_size(25)
        .border_style(BLUE)
        .background_style(BLUE.mix(0.1))
        .draw()
        .unwrap();
    root.present().unwrap();
    println!("Chart saved to {}", path.display());
}

fn draw_time_breakdown(args: &Args, results: &Results) {
    let path = args.output.join("plots").join("time_breakdown.png");
    let root = BitMapBackend::new(&path, (args.width, args.height)).into_drawing_area();
    let _ = root.fill(&WHITE);

    // Duplicate (size, workers) pairs collapse to the most recent record.
    let latest = results.latest_by_config();
    let mut by_size: BTreeMap<u64, Vec<&ExperimentRecord>> = BTreeMap::new();
    for (&(size, _workers), &record) in latest.iter() {
        by_size.entry(size).or_default().push(record);
    }

    let max_workers = *results.worker_counts().last().unwrap();
    // Shared y scale across subplots.
    let y_max = latest
        .values()
        .map(|record| record.phase_total_ms())
        .fold(1.0f64, f64::max)
        * 1.1;

    let root = root.margin(20, 20, 20, 20);
    let areas = root.split_evenly((1, by_size.len()));

    for (idx, ((size, records), area)) in by_size.iter().zip(areas.iter()).enumerate() {
        let mut chart = ChartBuilder::on(area)
            .caption(
                format!("{} datagrams", thousands(*size)),
                ("sans-serif", args.font_size, &BLACK),
            )
            .x_label_area_size(50)
            .y_label_area_size(if idx == 0 { 80 } else { 40 })
            .build_cartesian_2d(-1.0..max_workers as f64 + 1.0, 0.0..y_max)
            .unwrap();

        let mut mesh = chart.configure_mesh();
        mesh.x_desc("Workers")
            .axis_desc_style(("sans-serif", args.font_size, &BLACK))
            .disable_x_mesh()
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .x_label_style(("sans-serif", args.font_size, &BLACK))
            .y_label_style(("sans-serif", args.font_size, &BLACK));
        if idx == 0 {
            mesh.y_desc("Time (ms)");
        }
        mesh.draw().unwrap();

        for (phase_idx, &color) in PHASE_COLORS.iter().enumerate() {
            let label = records[0].phase_times()[phase_idx].0;
            chart
                .draw_series(records.iter().map(|record| {
                    let phases = record.phase_times();
                    let bottom: f64 = phases[..phase_idx].iter().map(|&(_name, time)| time).sum();
                    let top = bottom + phases[phase_idx].1;
                    Rectangle::new(
                        [(record.workers as f64 - 0.4, bottom), (record.workers as f64 + 0.4, top)],
                        color.mix(0.8).filled(),
                    )
                }))
                .unwrap()
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x - 10, y + 2), (x + 10, y - 2)], color.filled()));
        }

        // Single legend on the last subplot.
        if idx + 1 == by_size.len() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .label_font(("sans-serif", args.font_size, &BLACK))
                .margin(20)
                .legend_area_size(25)
                .border_style(BLUE)
                .background_style(BLUE.mix(0.1))
                .draw()
                .unwrap();
        }
    }

    root.present().unwrap();
    println!("Chart saved to {}", path.display());
}

fn print_cutoff_analysis(results: &Results) {
    let rule = "=".repeat(80);
    println!();
    println!("{}", rule);
    println!("Cutoff point analysis");
    println!("{}", rule);
    for analysis in cutoff_analysis(results) {
        println!();
        println!("Size: {} datagrams", thousands(analysis.datagram_count));
        for config in analysis.configs.iter() {
            println!(
                "  {} workers: {:.0} ms (speedup: {:.2}x, efficiency: {:.1}%) {}",
                config.workers, config.total_time_ms, config.speedup, config.efficiency, config.benefit
            );
        }
    }
    println!();
    println!("{}", rule);
}

fn main() {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("Error: can't find {}", args.input.display());
        eprintln!("Run the MIO client in experiment mode first to generate it");
        std::process::exit(1);
    }

    let results = Results::from_csv(&args.input);
    if results.records.is_empty() {
        eprintln!("Error: {} contains no experiment records", args.input.display());
        std::process::exit(1);
    }
    println!("Loaded {} experiment records from {}", results.records.len(), args.input.display());
    println!("  dataset sizes: {:?}", results.sizes());
    println!("  worker configurations: {:?}", results.worker_counts());

    std::fs::create_dir_all(args.output.join("plots")).expect("Can't create output folder for charts");

    draw_time_vs_size(&args, &results);
    draw_speedup(&args, &results);
    draw_throughput(&args, &results);
    draw_time_breakdown(&args, &results);

    print_cutoff_analysis(&results);

    let report_path = args.output.join("analysis_report.txt");
    File::create(&report_path)
        .expect("Can't create report file")
        .write_all(render_report(&results).as_bytes())
        .expect("Can't write report file");
    println!("Report saved to {}", report_path.display());
}
