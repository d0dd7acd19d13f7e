use std::path::PathBuf;

use thiserror::Error;

/// Результат для операций ADQ
pub type AdqResult<T> = std::result::Result<T, AdqError>;

/// Типы ошибок интерфейса сбора данных.
#[derive(Debug, Error)]
pub enum AdqError {
    /// Устройство сбора данных не удалось открыть
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Драйвер вернул не столько байт, сколько ожидалось
    #[error("Framing mismatch: read {got} bytes, expected {expected}")]
    FramingMismatch { got: usize, expected: usize },

    /// Файл записи отсутствует, неверного размера или не выровнен по блокам
    #[error("Invalid recording {path:?}: {reason}")]
    InvalidRecording { path: PathBuf, reason: String },

    /// Неправильное магическое число в заголовке батча
    #[error("Invalid header magic: {0:#010x}")]
    InvalidMagic(u32),

    /// Нарушение контракта вызова (буфер мал, колличество блоков вне лимита)
    #[error("Invalid batch request: {0}")]
    InvalidBatch(String),
}

impl AdqError {
    /// Удобные конструкторы
    pub fn device_unavailable<S: Into<String>>(s: S) -> Self {
        Self::DeviceUnavailable(s.into())
    }

    pub fn invalid_recording<P, S>(
        path: P,
        reason: S,
    ) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Self::InvalidRecording {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_batch<S: Into<String>>(s: S) -> Self {
        Self::InvalidBatch(s.into())
    }
}
