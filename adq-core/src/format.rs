//! Спецификация батчевого формата блоков АЦП
//!
//! Драйвер отдаёт данные фиксированными блоками. Клиент получает батч:
//! один заголовочный блок плюс N блоков данных. Все многобайтовые числа
//! заголовка хранятся в порядке little-endian.

use adq_types::{AdqError, AdqResult};

/// Размер одного блока данных в байтах (128 выборок по 4 байта)
pub const BLOCK_SIZE: usize = 512;

/// Магическое число заголовочного блока: b"ADQB" в LE представлении
pub const HEADER_MAGIC: u32 = u32::from_le_bytes(*b"ADQB");

/// Размер префикса заголовка: magic (u32) + num_blocks (u32)
pub const HEADER_PREFIX_SIZE: usize = 8;

/// Размер одной метки времени в байтах
pub const TIMESTAMP_SIZE: usize = 8;

/// Максимум блоков данных в одном батче: столько меток времени
/// помещается в заголовочный блок после префикса, не задевая данные
pub const MAX_BATCH_BLOCKS: usize = (BLOCK_SIZE - HEADER_PREFIX_SIZE) / TIMESTAMP_SIZE;

/// Номинальный шаг меток времени между соседними блоками, наносекунды
pub const SAMPLE_INTERVAL_NS: u64 = 32_000;

/// Минимальный размер файла записи в блоках
pub const MIN_RECORDING_BLOCKS: usize = 32;

/// Максимальный размер файла записи в блоках
pub const MAX_RECORDING_BLOCKS: usize = 1000;

/// Управляющий токен запуска сбора
pub const START_TOKEN: &[u8] = b"start";

/// Управляющий токен остановки сбора
pub const STOP_TOKEN: &[u8] = b"stop";

/// Размер батча в байтах: заголовочный блок + `num_blocks` блоков данных.
pub const fn batch_len(num_blocks: usize) -> usize {
    (1 + num_blocks) * BLOCK_SIZE
}

/// Ожидаемый размер сырого чтения из драйвера: блоки данных плюс
/// хвост из меток времени по 8 байт на блок.
pub const fn raw_len(num_blocks: usize) -> usize {
    num_blocks * (BLOCK_SIZE + TIMESTAMP_SIZE)
}

/// Размер запроса к драйверу. Запрашивается на блок больше, чем данных:
/// лишнее место покрывает хвост меток времени.
pub const fn request_len(num_blocks: usize) -> usize {
    (1 + num_blocks) * BLOCK_SIZE
}

/// Проверяет, что `num_blocks` не превышает ёмкость заголовка.
pub fn validate_num_blocks(num_blocks: usize) -> AdqResult<()> {
    if num_blocks > MAX_BATCH_BLOCKS {
        return Err(AdqError::invalid_batch(format!(
            "num_blocks={num_blocks} exceeds header capacity of {MAX_BATCH_BLOCKS}"
        )));
    }

    Ok(())
}

/// Проверяет контракт буфера батча: корректный `num_blocks` и буфер
/// не меньше `(1 + num_blocks) * BLOCK_SIZE` байт.
pub fn validate_batch(
    buf_len: usize,
    num_blocks: usize,
) -> AdqResult<()> {
    validate_num_blocks(num_blocks)?;

    let need = batch_len(num_blocks);
    if buf_len < need {
        return Err(AdqError::invalid_batch(format!(
            "batch buffer of {buf_len} bytes, need {need} for {num_blocks} blocks"
        )));
    }

    Ok(())
}
