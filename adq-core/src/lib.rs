//! Библиотека батчевого формата ADQ
//!
//! Эталонная реализация контракта доставки блоков АЦП: раскладка
//! заголовочного блока, размерные константы и трейт источника.
//!
//! # Быстрый старт
//!
//! ```
//! use adq_core::{batch_len, parse_batch, BatchHeaderExt, BLOCK_SIZE};
//! use adq_types::BatchHeader;
//!
//! let mut batch = vec![0u8; batch_len(2)];
//! let header = BatchHeader::new(vec![0, 32_000]);
//! header.write_to(&mut batch[..BLOCK_SIZE])?;
//!
//! let (parsed, data) = parse_batch(&batch)?;
//! assert_eq!(parsed.num_blocks, 2);
//! assert_eq!(data.len(), 2 * BLOCK_SIZE);
//! # Ok::<(), adq_types::AdqError>(())
//! ```

pub mod codec;
pub mod format;
pub mod source;

pub use codec::*;
pub use format::*;
pub use source::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
