use std::time::{Duration, Instant};

/// Execution statistics for one `run()` call.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total execution time.
    pub total_time: Duration,
    /// Number of texts classified.
    pub items_processed: usize,
}

impl PipelineStats {
    /// Start timing (call at the beginning of an operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }

    /// Mean time spent per item, zero when nothing was processed.
    pub fn per_item(&self) -> Duration {
        match u32::try_from(self.items_processed) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total_time / n,
        }
    }
}

/// Tracks timing from creation to `finish`.
pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    /// Finalize stats with the number of items processed.
    pub fn finish(self, items_processed: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            items_processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineStats;
    use std::time::Duration;

    #[test]
    fn per_item_divides_total_time() {
        let stats = PipelineStats {
            total_time: Duration::from_millis(300),
            items_processed: 3,
        };
        assert_eq!(stats.per_item(), Duration::from_millis(100));
    }

    #[test]
    fn per_item_is_zero_without_items() {
        let stats = PipelineStats::start().finish(0);
        assert_eq!(stats.items_processed, 0);
        assert_eq!(stats.per_item(), Duration::ZERO);
    }
}
