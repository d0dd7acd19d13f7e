//! Загрузка файла записи в память.

use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use adq_core::{BLOCK_SIZE, MAX_RECORDING_BLOCKS, MIN_RECORDING_BLOCKS};
use adq_types::{AdqError, AdqResult};

/// Запись целиком в памяти, выровненная по блокам.
#[derive(Debug)]
pub struct Recording {
    data: Vec<u8>,
    total_blocks: usize,
}

impl Recording {
    /// Загружает и проверяет файл записи.
    ///
    /// Порядок проверок: файл доступен, не меньше
    /// [`MIN_RECORDING_BLOCKS`] блоков, не больше
    /// [`MAX_RECORDING_BLOCKS`], размер кратен блоку. Дальше файл
    /// читается целиком, недочитанный остаток отвергает запись.
    pub fn load(path: &Path) -> AdqResult<Self> {
        let meta = fs::metadata(path)
            .map_err(|e| AdqError::invalid_recording(path, format!("not accessible: {e}")))?;
        let size = meta.len() as usize;

        let min = MIN_RECORDING_BLOCKS * BLOCK_SIZE;
        if size < min {
            return Err(AdqError::invalid_recording(
                path,
                format!("{size} bytes, need at least {min}"),
            ));
        }

        let max = MAX_RECORDING_BLOCKS * BLOCK_SIZE;
        if size > max {
            return Err(AdqError::invalid_recording(
                path,
                format!("{size} bytes, limit is {max}"),
            ));
        }

        if size % BLOCK_SIZE != 0 {
            return Err(AdqError::invalid_recording(
                path,
                format!("{size} bytes is not a multiple of the {BLOCK_SIZE}-byte block"),
            ));
        }

        let mut data = vec![0u8; size];
        let mut file = File::open(path)?;
        file.read_exact(&mut data)?;

        Ok(Self {
            data,
            total_blocks: size / BLOCK_SIZE,
        })
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// Срез `count` блоков начиная с блока `start`.
    pub fn blocks(
        &self,
        start: usize,
        count: usize,
    ) -> &[u8] {
        &self.data[start * BLOCK_SIZE..(start + count) * BLOCK_SIZE]
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn recording_file(num_blocks: usize) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        let mut block = [0u8; BLOCK_SIZE];

        for i in 0..num_blocks {
            block.fill(i as u8);
            tmp.write_all(&block).unwrap();
        }

        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn test_load_accepts_size_bounds() {
        let smallest = recording_file(MIN_RECORDING_BLOCKS);
        let rec = Recording::load(smallest.path()).unwrap();
        assert_eq!(rec.total_blocks(), 32);

        let largest = recording_file(MAX_RECORDING_BLOCKS);
        let rec = Recording::load(largest.path()).unwrap();
        assert_eq!(rec.total_blocks(), 1000);
    }

    #[test]
    fn test_load_rejects_undersized() {
        let tmp = recording_file(MIN_RECORDING_BLOCKS - 1);

        let err = Recording::load(tmp.path()).unwrap_err();
        assert!(matches!(err, AdqError::InvalidRecording { .. }));
    }

    #[test]
    fn test_load_rejects_oversized() {
        let tmp = recording_file(MAX_RECORDING_BLOCKS + 1);

        let err = Recording::load(tmp.path()).unwrap_err();
        assert!(matches!(err, AdqError::InvalidRecording { .. }));
    }

    #[test]
    fn test_load_rejects_unaligned() {
        let mut tmp = recording_file(MIN_RECORDING_BLOCKS);
        tmp.write_all(&[0u8; 100]).unwrap();
        tmp.flush().unwrap();

        let err = Recording::load(tmp.path()).unwrap_err();
        match err {
            AdqError::InvalidRecording { reason, .. } => {
                assert!(reason.contains("not a multiple"), "reason: {reason}");
            }
            other => panic!("ожидали InvalidRecording, получили {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let err = Recording::load(Path::new("/nonexistent/recording.adq")).unwrap_err();
        assert!(matches!(err, AdqError::InvalidRecording { .. }));
    }

    #[test]
    fn test_block_slices() {
        let tmp = recording_file(40);
        let rec = Recording::load(tmp.path()).unwrap();

        let slice = rec.blocks(3, 2);
        assert_eq!(slice.len(), 2 * BLOCK_SIZE);
        assert!(slice[..BLOCK_SIZE].iter().all(|&b| b == 3));
        assert!(slice[BLOCK_SIZE..].iter().all(|&b| b == 4));
    }
}
