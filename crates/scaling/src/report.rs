//! Text report emitted next to the charts.

use std::fmt::Write;

use crate::record::Results;

const RULE_WIDTH: usize = 80;

/// Format an integer with ',' thousands separators.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Render the analysis report: header, experiment summary and
/// per-configuration metrics grouped by dataset size with workers
/// ascending. Section headings keep the wording established by the
/// measured system's reports.
pub fn render_report(results: &Results) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let dash = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    writeln!(out, "{}", rule).unwrap();
    writeln!(out, "REPORTE DE ANÁLISIS DE ESCALABILIDAD").unwrap();
    writeln!(out, "Sistema MIO - Procesamiento Distribuido").unwrap();
    writeln!(out, "{}", rule).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "1. RESUMEN DE EXPERIMENTOS").unwrap();
    writeln!(out, "{}", dash).unwrap();
    writeln!(out, "Total de experimentos: {}", results.records.len()).unwrap();
    writeln!(out, "Tamaños probados: {:?}", results.sizes()).unwrap();
    writeln!(out, "Configuraciones de workers: {:?}", results.worker_counts()).unwrap();
    writeln!(out).unwrap();

    writeln!(out, "2. MÉTRICAS POR CONFIGURACIÓN").unwrap();
    writeln!(out, "{}", dash).unwrap();

    for (size, records) in results.by_size() {
        writeln!(out).unwrap();
        writeln!(out, "Tamaño: {} datagramas", thousands(size)).unwrap();
        for record in records {
            writeln!(out, "  Workers: {}", record.workers).unwrap();
            writeln!(out, "    Tiempo total: {:.0} ms", record.total_time_ms).unwrap();
            writeln!(out, "    Throughput: {:.0} datagramas/s", record.throughput_dps).unwrap();
            writeln!(out, "    Velocidad promedio: {:.2} km/h", record.avg_speed_kmh).unwrap();
            writeln!(out).unwrap();
        }
    }

    writeln!(out).unwrap();
    writeln!(out, "{}", rule).unwrap();
    out
}
