//! Final run report formatting

use stampede_core::StatsSnapshot;

/// Print a human-readable summary of the run to stdout
pub fn print_report(snapshot: &StatsSnapshot) {
    let total = snapshot.total_requests();
    let failures = snapshot.total_failures();

    println!();
    println!("=== stampede run report ===");
    println!("started:  {}", snapshot.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("requests: {} total, {} failed ({})", total, failures, percent(failures, total));
    println!();
    println!(
        "{:<14} {:>9} {:>9} {:>9} {:>8} {:>9} {:>8}",
        "task", "requests", "ok", "failed", "min(ms)", "mean(ms)", "max(ms)"
    );

    for (name, stats) in &snapshot.tasks {
        println!(
            "{:<14} {:>9} {:>9} {:>9} {:>8} {:>9.1} {:>8}",
            name,
            stats.total(),
            stats.success_count,
            stats.failure_count,
            stats.latency.min_ms,
            stats.latency.mean_ms(),
            stats.latency.max_ms,
        );
    }

    let mut printed_header = false;
    for (name, stats) in &snapshot.tasks {
        for (reason, count) in &stats.failure_reasons {
            if !printed_header {
                println!();
                println!("failure reasons:");
                printed_header = true;
            }
            println!("  {:<14} {:>6}x  {}", name, count, truncate(reason, 100));
        }
    }
    println!();
}

fn percent(part: u64, whole: u64) -> String {
    if whole == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / whole as f64)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_handles_zero_total() {
        assert_eq!(percent(0, 0), "0.0%");
        assert_eq!(percent(1, 4), "25.0%");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 100), "short");
        let truncated = truncate(&"é".repeat(100), 101);
        assert!(truncated.ends_with("..."));
    }
}
