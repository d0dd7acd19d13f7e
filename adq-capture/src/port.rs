//! Порт устройства: байтовый канал к драйверу сбора данных.
//!
//! Драйвер виден процессу как символьное устройство. Управляющие токены
//! уходят через write, сырые блоки приходят через read. Трейт отделяет
//! канал от файловой системы, чтобы протокол можно было гонять на
//! скриптованном дублёре.

use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::PathBuf,
};

use adq_types::{AdqError, AdqResult};

/// Байтовый канал к источнику блоков.
pub trait DevicePort: Read + Write + Send {}

impl DevicePort for File {}

/// Открывает порт устройства.
// Реализации: [`CharDeviceOpener`] для боевого драйвера, скриптованный
// дублёр в тестах канала.
pub trait PortOpener: Send {
    fn open(&mut self) -> AdqResult<Box<dyn DevicePort>>;
}

/// Открывает символьное устройство драйвера на чтение и запись.
#[derive(Debug, Clone)]
pub struct CharDeviceOpener {
    pub path: PathBuf,
}

impl CharDeviceOpener {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl PortOpener for CharDeviceOpener {
    fn open(&mut self) -> AdqResult<Box<dyn DevicePort>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| {
                AdqError::device_unavailable(format!("{}: {e}", self.path.display()))
            })?;

        Ok(Box::new(file))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тестовые дублёры
////////////////////////////////////////////////////////////////////////////////
