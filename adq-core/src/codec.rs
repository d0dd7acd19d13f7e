//! Кодек заголовочного блока
//!
//! Заголовок живёт в блоке с индексом 0 батча. Раскладка:
//!
//! ```text
//! [0..4)   magic       u32 LE
//! [4..8)   num_blocks  u32 LE
//! [8..8+8N) timestamps  u64 LE, по одной на блок данных
//! остаток  нули
//! ```
//!
//! Область меток времени по построению не пересекается с блоками данных:
//! [`MAX_BATCH_BLOCKS`] подобран так, чтобы префикс и все метки умещались
//! в один блок.

use adq_types::{AdqError, AdqResult, BatchHeader};
use byteorder::{ByteOrder, LittleEndian};

use crate::format::{
    validate_num_blocks, BLOCK_SIZE, HEADER_MAGIC, HEADER_PREFIX_SIZE, MAX_BATCH_BLOCKS,
    TIMESTAMP_SIZE,
};

/// Сериализация заголовка батча в заголовочный блок и обратно.
pub trait BatchHeaderExt: Sized {
    /// Записывает заголовок в блок 0 (ровно [`BLOCK_SIZE`] байт).
    fn write_to(&self, header_block: &mut [u8]) -> AdqResult<()>;

    /// Читает и проверяет заголовок из блока 0.
    fn read_from(header_block: &[u8]) -> AdqResult<Self>;
}

impl BatchHeaderExt for BatchHeader {
    fn write_to(&self, header_block: &mut [u8]) -> AdqResult<()> {
        if header_block.len() < BLOCK_SIZE {
            return Err(AdqError::invalid_batch(format!(
                "header block of {} bytes, need {BLOCK_SIZE}",
                header_block.len()
            )));
        }
        if !self.is_consistent() {
            return Err(AdqError::invalid_batch(format!(
                "header has {} timestamps for num_blocks={}",
                self.timestamps.len(),
                self.num_blocks
            )));
        }
        validate_num_blocks(self.num_blocks as usize)?;

        LittleEndian::write_u32(&mut header_block[0..4], HEADER_MAGIC);
        LittleEndian::write_u32(&mut header_block[4..8], self.num_blocks);

        let mut off = HEADER_PREFIX_SIZE;
        for ts in &self.timestamps {
            LittleEndian::write_u64(&mut header_block[off..off + TIMESTAMP_SIZE], *ts);
            off += TIMESTAMP_SIZE;
        }

        // Остаток заголовочного блока детерминированно зануляется
        header_block[off..BLOCK_SIZE].fill(0);

        Ok(())
    }

    fn read_from(header_block: &[u8]) -> AdqResult<Self> {
        if header_block.len() < BLOCK_SIZE {
            return Err(AdqError::invalid_batch(format!(
                "header block of {} bytes, need {BLOCK_SIZE}",
                header_block.len()
            )));
        }

        let magic = LittleEndian::read_u32(&header_block[0..4]);
        if magic != HEADER_MAGIC {
            return Err(AdqError::InvalidMagic(magic));
        }

        let num_blocks = LittleEndian::read_u32(&header_block[4..8]);
        if num_blocks as usize > MAX_BATCH_BLOCKS {
            return Err(AdqError::invalid_batch(format!(
                "header claims {num_blocks} blocks, capacity is {MAX_BATCH_BLOCKS}"
            )));
        }

        let mut timestamps = Vec::with_capacity(num_blocks as usize);
        let mut off = HEADER_PREFIX_SIZE;
        for _ in 0..num_blocks {
            timestamps.push(LittleEndian::read_u64(
                &header_block[off..off + TIMESTAMP_SIZE],
            ));
            off += TIMESTAMP_SIZE;
        }

        Ok(BatchHeader {
            num_blocks,
            timestamps,
        })
    }
}

/// Разбирает батч на заголовок и срез блоков данных.
///
/// Буфер должен вмещать заголовочный блок и все блоки данных,
/// заявленные в `num_blocks` заголовка.
pub fn parse_batch(batch: &[u8]) -> AdqResult<(BatchHeader, &[u8])> {
    let header = BatchHeader::read_from(batch)?;

    let data_len = header.num_blocks as usize * BLOCK_SIZE;
    let need = BLOCK_SIZE + data_len;
    if batch.len() < need {
        return Err(AdqError::invalid_batch(format!(
            "batch of {} bytes, header claims {} data blocks ({need} bytes total)",
            batch.len(),
            header.num_blocks
        )));
    }

    Ok((header, &batch[BLOCK_SIZE..need]))
}

////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////
