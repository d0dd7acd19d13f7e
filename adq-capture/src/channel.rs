//! Канал устройства: владение портом и три сырые операции.
//!
//! Порт открывается лениво при первом обращении и живёт до конца сессии.
//! Неудачное открытие оставляет канал пустым, следующий вызов честно
//! пробует открыть заново.

use std::{
    sync::{atomic::Ordering, Arc},
    thread,
};

use adq_core::{raw_len, request_len, START_TOKEN, STOP_TOKEN};
use adq_types::{AdqError, AdqResult};
use log::warn;

use crate::{
    config::ChannelConfig,
    metrics::CaptureMetrics,
    port::{CharDeviceOpener, DevicePort, PortOpener},
};

/// Канал к источнику блоков.
pub struct DeviceChannel {
    config: ChannelConfig,
    opener: Box<dyn PortOpener>,
    port: Option<Box<dyn DevicePort>>,
    metrics: Arc<CaptureMetrics>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl DeviceChannel {
    /// Канал к символьному устройству из конфигурации.
    pub fn new(config: ChannelConfig) -> Self {
        let opener = CharDeviceOpener::new(config.device_path.clone());
        Self::with_opener(config, Box::new(opener))
    }

    /// Канал с произвольным опенером (тесты, нестандартный транспорт).
    pub fn with_opener(
        config: ChannelConfig,
        opener: Box<dyn PortOpener>,
    ) -> Self {
        Self {
            config,
            opener,
            port: None,
            metrics: CaptureMetrics::new(),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<CaptureMetrics> {
        self.metrics.clone()
    }

    /// Порт уже открыт?
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Идемпотентно открывает порт при первом обращении.
    ///
    /// При неудаче состояние остаётся пустым, без полузакрытого хэндла.
    pub fn ensure_open(&mut self) -> AdqResult<()> {
        if self.port.is_some() {
            return Ok(());
        }

        match self.opener.open() {
            Ok(port) => {
                self.port = Some(port);
                Ok(())
            }
            Err(e) => {
                warn!("Error opening driver: {e}");
                self.port = None;
                Err(e)
            }
        }
    }

    /// Запускает сбор. `Ok(true)` только если токен ушёл целиком.
    pub fn start(&mut self) -> AdqResult<bool> {
        self.send_token(START_TOKEN)
    }

    /// Останавливает сбор, контракт тот же.
    pub fn stop(&mut self) -> AdqResult<bool> {
        self.send_token(STOP_TOKEN)
    }

    fn send_token(
        &mut self,
        token: &[u8],
    ) -> AdqResult<bool> {
        self.ensure_open()?;
        let Some(port) = self.port.as_mut() else {
            return Err(AdqError::device_unavailable("port missing after open"));
        };

        match port.write(token) {
            Ok(n) if n == token.len() => Ok(true),
            Ok(n) => {
                warn!(
                    "Control token {:?} partially accepted: {n} of {} bytes",
                    String::from_utf8_lossy(token),
                    token.len()
                );
                Ok(false)
            }
            Err(e) => {
                warn!("Control token write error: {e}");
                Err(AdqError::Io(e))
            }
        }
    }

    /// Сырое чтение `num_blocks` блоков в `scratch`.
    ///
    /// Драйвер отвечает либо ровно `num_blocks * (BLOCK_SIZE + 8)` байт
    /// (блоки данных плюс хвост меток времени), либо нулём. Пустой ответ
    /// повторяется после паузы, пока не исчерпан бюджет попыток, тогда
    /// возвращается `Ok(0)`. Любой другой размер — ошибка кадрирования,
    /// без повтора. Ошибка чтения тоже отдаётся сразу.
    pub fn read_raw(
        &mut self,
        scratch: &mut [u8],
        num_blocks: usize,
    ) -> AdqResult<usize> {
        let request = request_len(num_blocks);
        let expected = raw_len(num_blocks);

        if scratch.len() < request {
            return Err(AdqError::invalid_batch(format!(
                "scratch buffer of {} bytes, need {request}",
                scratch.len()
            )));
        }

        self.ensure_open()?;
        let Some(port) = self.port.as_mut() else {
            return Err(AdqError::device_unavailable("port missing after open"));
        };

        let mut retries = 0;
        while retries < self.config.read_retries {
            let len = match port.read(&mut scratch[..request]) {
                Ok(n) => n,
                Err(e) => {
                    warn!("Driver read error: {e}");
                    return Err(AdqError::Io(e));
                }
            };

            if len == 0 {
                retries += 1;
                self.metrics.empty_reads.fetch_add(1, Ordering::Relaxed);
                thread::sleep(self.config.retry_backoff);
                continue;
            }

            if len != expected {
                warn!("Driver read returned {len} expected {expected}");
                self.metrics.framing_errors.fetch_add(1, Ordering::Relaxed);
                return Err(AdqError::FramingMismatch {
                    got: len,
                    expected,
                });
            }

            return Ok(len);
        }

        Ok(0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::Ordering,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::port::testing::{FakePort, ScriptedOpener};

    fn test_config() -> ChannelConfig {
        ChannelConfig {
            retry_backoff: Duration::from_millis(5),
            ..ChannelConfig::default()
        }
    }

    fn channel_with_port(port: FakePort) -> DeviceChannel {
        DeviceChannel::with_opener(test_config(), Box::new(ScriptedOpener::single(port)))
    }

    #[test]
    fn test_start_sends_full_token() {
        let port = FakePort::new();
        let written = port.written.clone();
        let mut channel = channel_with_port(port);

        assert!(channel.start().unwrap());
        assert_eq!(written.lock().unwrap().as_slice(), b"start");
    }

    #[test]
    fn test_stop_sends_full_token() {
        let port = FakePort::new();
        let written = port.written.clone();
        let mut channel = channel_with_port(port);

        assert!(channel.stop().unwrap());
        assert_eq!(written.lock().unwrap().as_slice(), b"stop");
    }

    #[test]
    fn test_start_partial_token_is_failure() {
        // драйвер принял 3 байта из 5 — запуск не состоялся
        let port = FakePort::new().push_write(Ok(3));
        let mut channel = channel_with_port(port);

        assert!(!channel.start().unwrap());
    }

    #[test]
    fn test_token_write_error_surfaces() {
        let port =
            FakePort::new().push_write(Err(io::Error::new(io::ErrorKind::Other, "bus fault")));
        let mut channel = channel_with_port(port);

        let err = channel.start().unwrap_err();
        assert!(matches!(err, AdqError::Io(_)));
        // порт не сбрасывается, канал жив
        assert!(channel.is_open());
    }

    #[test]
    fn test_port_opened_lazily_and_reused() {
        let port = FakePort::new().push_read(Ok(vec![0u8; raw_len(1)]));
        let opener = ScriptedOpener::single(port);
        let opens = opener.opens.clone();
        let mut channel = DeviceChannel::with_opener(test_config(), Box::new(opener));

        assert_eq!(opens.load(Ordering::Relaxed), 0, "до первой операции");

        channel.start().unwrap();
        assert_eq!(opens.load(Ordering::Relaxed), 1);

        let mut scratch = vec![0u8; request_len(1)];
        channel.read_raw(&mut scratch, 1).unwrap();
        assert_eq!(opens.load(Ordering::Relaxed), 1, "порт переиспользуется");
    }

    #[test]
    fn test_failed_open_retried_from_scratch() {
        let opener = ScriptedOpener::new(vec![
            Err(AdqError::device_unavailable("no node")),
            Ok(Box::new(FakePort::new())),
        ]);
        let opens = opener.opens.clone();
        let mut channel = DeviceChannel::with_opener(test_config(), Box::new(opener));

        let err = channel.start().unwrap_err();
        assert!(matches!(err, AdqError::DeviceUnavailable(_)));
        assert!(!channel.is_open(), "после неудачи состояние пустое");

        // следующий вызов открывает заново
        assert!(channel.start().unwrap());
        assert_eq!(opens.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_read_raw_exact_payload() {
        let payload = vec![7u8; raw_len(2)];
        let port = FakePort::new().push_read(Ok(payload.clone()));
        let mut channel = channel_with_port(port);

        let mut scratch = vec![0u8; request_len(2)];
        let got = channel.read_raw(&mut scratch, 2).unwrap();

        assert_eq!(got, raw_len(2));
        assert_eq!(&scratch[..got], payload.as_slice());
    }

    #[test]
    fn test_read_raw_empty_then_success() {
        let port = FakePort::new()
            .push_read(Ok(vec![]))
            .push_read(Ok(vec![1u8; raw_len(1)]));
        let mut channel = channel_with_port(port);
        let metrics = channel.metrics();

        let mut scratch = vec![0u8; request_len(1)];
        let got = channel.read_raw(&mut scratch, 1).unwrap();

        assert_eq!(got, raw_len(1));
        assert_eq!(metrics.empty_reads.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_read_raw_retry_budget_exhausted() {
        // очередь пуста: каждый read отвечает нулём байт
        let mut channel = channel_with_port(FakePort::new());
        let metrics = channel.metrics();

        let mut scratch = vec![0u8; request_len(4)];
        let started = Instant::now();
        let got = channel.read_raw(&mut scratch, 4).unwrap();

        assert_eq!(got, 0, "после всех попыток — деградация, не зависание");
        assert_eq!(metrics.empty_reads.load(Ordering::Relaxed), 2);
        // пауза выдерживается после каждого пустого чтения
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_read_raw_error_not_retried() {
        let port = FakePort::new()
            .push_read(Err(io::Error::new(io::ErrorKind::Other, "dma stall")))
            .push_read(Ok(vec![0u8; raw_len(1)]));
        let mut channel = channel_with_port(port);

        let err = channel.read_raw(&mut vec![0u8; request_len(1)], 1).unwrap_err();
        assert!(matches!(err, AdqError::Io(_)), "ошибка без повтора");
    }

    #[test]
    fn test_read_raw_framing_mismatch_not_retried() {
        // неожиданный размер, затем валидный ответ: повтора быть не должно
        let port = FakePort::new()
            .push_read(Ok(vec![0u8; 100]))
            .push_read(Ok(vec![0u8; raw_len(1)]));
        let mut channel = channel_with_port(port);
        let metrics = channel.metrics();

        let err = channel.read_raw(&mut vec![0u8; request_len(1)], 1).unwrap_err();
        match err {
            AdqError::FramingMismatch { got, expected } => {
                assert_eq!(got, 100);
                assert_eq!(expected, raw_len(1));
            }
            other => panic!("ожидали FramingMismatch, получили {other:?}"),
        }
        assert_eq!(metrics.framing_errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_read_raw_scratch_too_small() {
        let mut channel = channel_with_port(FakePort::new());

        let err = channel.read_raw(&mut vec![0u8; 10], 2).unwrap_err();
        assert!(matches!(err, AdqError::InvalidBatch(_)));
    }
}
