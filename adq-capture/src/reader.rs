//! Сборка батчей из сырых ответов драйвера.
//!
//! Драйвер отдаёт блоки данных подряд, а метки времени хвостом после
//! них. Клиенту же нужен батч с заголовочным блоком впереди. Читатель
//! принимает сырой ответ в свой рабочий буфер, переносит блоки данных
//! со сдвигом на один блок и собирает заголовок из хвоста меток.

use std::sync::{atomic::Ordering, Arc};

use adq_core::{
    request_len, validate_batch, BatchHeaderExt, BlockSource, BLOCK_SIZE, TIMESTAMP_SIZE,
};
use adq_types::{AdqResult, BatchHeader};
use byteorder::{ByteOrder, LittleEndian};
use log::info;

use crate::{channel::DeviceChannel, config::ChannelConfig, metrics::CaptureMetrics};

/// Источник батчей поверх живого устройства.
pub struct LiveReader {
    channel: DeviceChannel,
    // Рабочий буфер сырых чтений, переживает вызовы и растёт один раз
    scratch: Vec<u8>,
    metrics: Arc<CaptureMetrics>,
}

impl LiveReader {
    pub fn new(config: ChannelConfig) -> Self {
        Self::with_channel(DeviceChannel::new(config))
    }

    pub fn with_channel(channel: DeviceChannel) -> Self {
        let metrics = channel.metrics();
        Self {
            channel,
            scratch: Vec::new(),
            metrics,
        }
    }

    pub fn channel(&self) -> &DeviceChannel {
        &self.channel
    }

    /// Общие счётчики канала и читателя.
    pub fn metrics(&self) -> Arc<CaptureMetrics> {
        self.metrics.clone()
    }
}

impl BlockSource for LiveReader {
    fn start(&mut self) -> AdqResult<bool> {
        self.channel.start()
    }

    fn stop(&mut self) -> AdqResult<bool> {
        self.channel.stop()
    }

    fn read_batch(
        &mut self,
        batch: &mut [u8],
        num_blocks: usize,
    ) -> AdqResult<usize> {
        validate_batch(batch.len(), num_blocks)?;

        if num_blocks == 0 {
            // Пустой запрос открывает устройство, но чтения не делает
            self.channel.ensure_open()?;
            return Ok(0);
        }

        self.scratch.resize(request_len(num_blocks), 0);
        let got = self.channel.read_raw(&mut self.scratch, num_blocks)?;
        if got == 0 {
            self.metrics.exhausted_reads.fetch_add(1, Ordering::Relaxed);
            return Ok(0);
        }

        // Канал гарантирует ровно num_blocks блоков плюс хвост меток
        let data_len = num_blocks * BLOCK_SIZE;
        batch[BLOCK_SIZE..BLOCK_SIZE + data_len].copy_from_slice(&self.scratch[..data_len]);

        let mut timestamps = Vec::with_capacity(num_blocks);
        let mut off = data_len;
        for _ in 0..num_blocks {
            timestamps.push(LittleEndian::read_u64(
                &self.scratch[off..off + TIMESTAMP_SIZE],
            ));
            off += TIMESTAMP_SIZE;
        }

        BatchHeader::new(timestamps).write_to(&mut batch[..BLOCK_SIZE])?;

        self.metrics.batches_read.fetch_add(1, Ordering::Relaxed);
        self.metrics
            .blocks_read
            .fetch_add(num_blocks as u64, Ordering::Relaxed);
        self.metrics.bytes_read.fetch_add(got as u64, Ordering::Relaxed);

        Ok(num_blocks + 1)
    }

    fn dump_stats(&self) {
        info!(
            "Live source {}: open={} batches={} blocks={} empty={} exhausted={} framing_errors={}",
            self.channel.config().device_path.display(),
            self.channel.is_open(),
            self.metrics.batches_read.load(Ordering::Relaxed),
            self.metrics.blocks_read.load(Ordering::Relaxed),
            self.metrics.empty_reads.load(Ordering::Relaxed),
            self.metrics.exhausted_reads.load(Ordering::Relaxed),
            self.metrics.framing_errors.load(Ordering::Relaxed),
        );
    }
}
