use std::path::PathBuf;
use streamwatch_core::outcome::PipelineReport;

pub fn print(report: &PipelineReport, written: &[PathBuf], show_violations: bool) {
    println!("=== {} (sheet '{}') ===\n", report.dataset, report.sheet);

    let counts = [
        ("Loaded", report.loaded),
        ("Skipped (bad cells)", report.skipped.len()),
        ("Sentinels cleared", report.nulled_sentinels),
        ("Classified", report.classified),
        ("Units converted", report.converted),
        ("Verdicts", report.verdicts),
        ("Dropped (no verdict)", report.verdict_dropped),
        ("Filtered out", report.filtered_out),
        ("Duplicates removed", report.deduped),
        ("Domain violations", report.violations.len()),
        ("Output rows", report.output_records),
    ];
    for (label, count) in counts {
        println!("  {:<22} {:>8}", label, count);
    }
    if let Some(stations) = report.stations {
        println!("  {:<22} {:>8}", "Stations", stations);
    }
    println!();

    if !report.skipped.is_empty() {
        println!("Skipped rows:");
        for s in &report.skipped {
            println!("  row {:<6} {}", s.row, s.reason);
        }
        println!();
    }

    if !report.violations.is_empty() {
        if show_violations {
            println!("Violations:");
            let width = report
                .violations
                .iter()
                .map(|v| v.field.len())
                .max()
                .unwrap_or(10);
            for v in &report.violations {
                println!(
                    "  row {:<6} {:<width$}  {}",
                    v.row,
                    v.field,
                    v.reason,
                    width = width
                );
            }
        } else {
            println!(
                "{} value(s) outside their domain or range (use --show-violations to list them).",
                report.violations.len()
            );
        }
        println!();
    }

    for path in written {
        println!("Wrote {}", path.display());
    }
}
