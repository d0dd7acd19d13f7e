//! Живой сбор: канал к драйверу АЦП и сборка батчей из сырых чтений.

pub mod channel;
pub mod config;
pub mod metrics;
pub mod port;
pub mod reader;

pub use channel::*;
pub use config::*;
pub use metrics::*;
pub use port::*;
pub use reader::*;
