use memory_stats::memory_stats;

pub fn log_memory_usage(message: &str) {
    if let Some(usage) = memory_stats() {
        log::debug!(
            "{} --- Memory usage: {:.2} GB",
            message,
            usage.physical_mem as f64 / 1_000_000_000.
        );
    } else {
        log::debug!("{} --- Memory usage: unknown", message);
    }
}
