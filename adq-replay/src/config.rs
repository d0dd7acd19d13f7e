use std::{path::PathBuf, time::Duration};

use adq_core::SAMPLE_INTERVAL_NS;

/// Пауза на один запрос, имитирующая задержку живого драйвера.
///
/// На 8 МГц (DEFAULT_CLKDIV = 12) выборка занимает 32 мкс,
/// 32 блока = 32 мкс * 128 выборок/блок * 32 = 131.072 мс.
pub const TRANSFER_DELAY: Duration = Duration::from_millis(120);

/// Конфигурация воспроизведения записи.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Путь к файлу записи
    pub recording: PathBuf,
    /// Пауза после сборки каждого батча
    pub pacing: Duration,
    /// Шаг синтезированных меток времени, наносекунды
    pub sample_interval_ns: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            recording: PathBuf::from("recording.adq"),
            pacing: TRANSFER_DELAY,
            sample_interval_ns: SAMPLE_INTERVAL_NS,
        }
    }
}
