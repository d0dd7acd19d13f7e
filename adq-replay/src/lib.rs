//! Файловая симуляция источника блоков.
//!
//! Отдаёт батчи из файла записи с тем же контрактом, что и живое
//! устройство: известные данные для повторяемых прогонов клиентов.

pub mod config;
pub mod metrics;
pub mod player;
pub mod recording;

pub use config::*;
pub use metrics::*;
pub use player::*;
pub use recording::*;
