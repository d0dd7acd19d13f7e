//! Проигрыватель записи: курсор по файлу и синтез меток времени.

use std::{
    path::{Path, PathBuf},
    sync::{atomic::Ordering, Arc},
    thread,
};

use adq_core::{validate_batch, BatchHeaderExt, BlockSource, BLOCK_SIZE};
use adq_types::{AdqError, AdqResult, BatchHeader};
use log::{info, warn};

use crate::{config::ReplayConfig, metrics::ReplayMetrics, recording::Recording};

/// Загруженная запись вместе с позицией воспроизведения.
struct PlayState {
    identity: PathBuf,
    recording: Recording,
    cursor: usize,
    last_timestamp: u64,
}

/// Источник батчей поверх файла записи.
///
/// Запись кэшируется между чтениями. Кэш действителен, пока запрошен
/// тот же файл и позиция курсора не вышла за запись; иначе прежнее
/// состояние выбрасывается целиком и файл загружается заново.
pub struct RecordingPlayer {
    config: ReplayConfig,
    state: Option<PlayState>,
    metrics: Arc<ReplayMetrics>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RecordingPlayer {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            state: None,
            metrics: ReplayMetrics::new(),
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<ReplayMetrics> {
        self.metrics.clone()
    }

    /// Кэш действителен для `path`?
    pub fn is_loaded(
        &self,
        path: &Path,
    ) -> bool {
        match &self.state {
            Some(s) => {
                s.identity == path
                    && s.recording.total_blocks() > 0
                    && s.cursor < s.recording.total_blocks()
            }
            None => false,
        }
    }

    /// Готовит запись `path` к чтению.
    ///
    /// `Ok(true)` при свежей загрузке, `Ok(false)` при повторном
    /// использовании кэша. Прежнее состояние выбрасывается до проверки
    /// нового файла: после неудачной загрузки не остаётся ничего.
    pub fn ensure_loaded(
        &mut self,
        path: &Path,
    ) -> AdqResult<bool> {
        if self.is_loaded(path) {
            self.metrics.reuses.fetch_add(1, Ordering::Relaxed);
            return Ok(false);
        }

        self.state = None;

        let recording = Recording::load(path)?;
        self.state = Some(PlayState {
            identity: path.to_path_buf(),
            recording,
            cursor: 0,
            last_timestamp: 0,
        });
        self.metrics.loads.fetch_add(1, Ordering::Relaxed);

        Ok(true)
    }

    /// Читает `num_blocks` блоков записи `path` в `batch`.
    ///
    /// Контракт буфера тот же, что у живого чтения. Курсор идёт по
    /// записи циклически: дойдя до конца, копирование продолжается с
    /// нулевого блока в том же запросе. Метки времени синтезируются
    /// от нуля с шагом конфигурации и через обороты не сбрасываются.
    /// Возвращает `num_blocks + 1`, при `num_blocks == 0` батч состоит
    /// из одного заголовка и результат равен 1.
    pub fn read_from(
        &mut self,
        path: &Path,
        batch: &mut [u8],
        num_blocks: usize,
    ) -> AdqResult<usize> {
        if path.as_os_str().is_empty() {
            return Err(AdqError::invalid_recording(path, "empty recording path"));
        }
        validate_batch(batch.len(), num_blocks)?;

        if let Err(e) = self.ensure_loaded(path) {
            warn!("Recording init failed: {e}");
            return Err(e);
        }
        let Some(state) = self.state.as_mut() else {
            return Err(AdqError::invalid_recording(path, "no recording loaded"));
        };

        let total = state.recording.total_blocks();
        let mut copied = 0;
        while copied < num_blocks {
            let mut count = total - state.cursor;
            if count > num_blocks - copied {
                count = num_blocks - copied;
            }

            let dst = (1 + copied) * BLOCK_SIZE;
            batch[dst..dst + count * BLOCK_SIZE]
                .copy_from_slice(state.recording.blocks(state.cursor, count));

            copied += count;
            state.cursor += count;

            if state.cursor >= total {
                state.cursor = 0;
                self.metrics.wraps.fetch_add(1, Ordering::Relaxed);
            }
        }

        let mut timestamps = Vec::with_capacity(num_blocks);
        for _ in 0..num_blocks {
            timestamps.push(state.last_timestamp);
            state.last_timestamp += self.config.sample_interval_ns;
        }

        BatchHeader::new(timestamps).write_to(&mut batch[..BLOCK_SIZE])?;

        self.metrics.reads_served.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .blocks_served
            .fetch_add(num_blocks as u64, Ordering::Relaxed);

        // Настоящий драйвер копит блоки заметное время, имитируем
        thread::sleep(self.config.pacing);

        Ok(num_blocks + 1)
    }
}

impl BlockSource for RecordingPlayer {
    /// Файлу нечего запускать, команда всегда принята.
    fn start(&mut self) -> AdqResult<bool> {
        Ok(true)
    }

    fn stop(&mut self) -> AdqResult<bool> {
        Ok(true)
    }

    fn read_batch(
        &mut self,
        batch: &mut [u8],
        num_blocks: usize,
    ) -> AdqResult<usize> {
        let path = self.config.recording.clone();
        self.read_from(&path, batch, num_blocks)
    }

    fn dump_stats(&self) {
        match &self.state {
            Some(s) => info!(
                "Recording {}: total_blocks={} cursor={} reads={} wraps={}",
                s.identity.display(),
                s.recording.total_blocks(),
                s.cursor,
                self.metrics.reads_served.load(Ordering::Relaxed),
                self.metrics.wraps.load(Ordering::Relaxed),
            ),
            None => info!("Recording: none loaded"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
