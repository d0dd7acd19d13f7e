use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Счётчики живого пути чтения.
#[derive(Debug, Default)]
pub struct CaptureMetrics {
    pub batches_read: AtomicU64,
    pub blocks_read: AtomicU64,
    pub bytes_read: AtomicU64,
    pub empty_reads: AtomicU64,
    pub exhausted_reads: AtomicU64,
    pub framing_errors: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    pub duration_secs: f64,
    pub batches_read: u64,
    pub blocks_read: u64,
    pub bytes_read: u64,
    pub empty_reads: u64,
    pub exhausted_reads: u64,
    pub framing_errors: u64,
    pub read_speed_mbps: f64,
}

impl CaptureMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Скорость чтения в МБ/с.
    pub fn read_speed_mbps(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.bytes_read.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> CaptureSummary {
        CaptureSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            batches_read: self.batches_read.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            empty_reads: self.empty_reads.load(Ordering::Relaxed),
            exhausted_reads: self.exhausted_reads.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            read_speed_mbps: self.read_speed_mbps(elapsed),
        }
    }
}

impl std::fmt::Display for CaptureSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Batches       : {}", self.batches_read)?;
        writeln!(f, "  Blocks        : {}", self.blocks_read)?;
        writeln!(f, "  Bytes read    : {:.1} MB", self.bytes_read as f64 / 1e6)?;
        writeln!(f, "  Empty reads   : {}", self.empty_reads)?;
        writeln!(f, "  Exhausted     : {}", self.exhausted_reads)?;
        writeln!(f, "  Framing errors: {}", self.framing_errors)?;
        writeln!(f, "  Read speed    : {:.1} MB/s", self.read_speed_mbps)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
