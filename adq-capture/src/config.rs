use std::{path::PathBuf, time::Duration};

/// Путь к символьному устройству драйвера по умолчанию.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/adq0";

/// Сколько всего попыток чтения при пустых ответах драйвера.
pub const READ_RETRIES: u32 = 2;

/// Пауза перед повтором после пустого чтения.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Конфигурация канала устройства.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Путь к символьному устройству драйвера
    pub device_path: PathBuf,
    /// Попыток чтения при пустых ответах
    pub read_retries: u32,
    /// Пауза между попытками
    pub retry_backoff: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            read_retries: READ_RETRIES,
            retry_backoff: RETRY_BACKOFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_contract() {
        let config = ChannelConfig::default();

        assert_eq!(config.device_path, PathBuf::from("/dev/adq0"));
        assert_eq!(config.read_retries, 2);
        assert_eq!(config.retry_backoff, Duration::from_millis(50));
    }
}
