use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Счётчики пути воспроизведения.
#[derive(Debug, Default)]
pub struct ReplayMetrics {
    /// Свежих загрузок файла записи
    pub loads: AtomicU64,
    /// Повторных использований уже загруженной записи
    pub reuses: AtomicU64,
    /// Обслуженных запросов чтения
    pub reads_served: AtomicU64,
    /// Отданных блоков данных
    pub blocks_served: AtomicU64,
    /// Оборотов курсора через конец записи
    pub wraps: AtomicU64,
}

impl ReplayMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Средний размер запроса в блоках.
    pub fn avg_blocks_per_read(&self) -> f64 {
        let reads = self.reads_served.load(Ordering::Relaxed);

        if reads == 0 {
            return 0.0;
        }

        self.blocks_served.load(Ordering::Relaxed) as f64 / reads as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg_blocks_per_read() {
        let metrics = ReplayMetrics::new();
        assert_eq!(metrics.avg_blocks_per_read(), 0.0);

        metrics.reads_served.store(4, Ordering::Relaxed);
        metrics.blocks_served.store(32, Ordering::Relaxed);
        assert!((metrics.avg_blocks_per_read() - 8.0).abs() < 1e-9);
    }
}
