//! Абстракция источника блоков.

use adq_types::AdqResult;

/// Источник батчей блоков АЦП.
// Реализации: `LiveReader` (живое устройство) и `RecordingPlayer`
// (файл записи). Режим выбирается один раз на время сессии.
pub trait BlockSource: Send {
    /// Запускает сбор данных. `Ok(true)` если управляющий токен
    /// принят источником целиком.
    fn start(&mut self) -> AdqResult<bool>;

    /// Останавливает сбор данных, контракт тот же что у [`start`].
    ///
    /// [`start`]: BlockSource::start
    fn stop(&mut self) -> AdqResult<bool>;

    /// Читает `num_blocks` блоков в `batch`.
    ///
    /// Буфер предоставляет вызывающий, размером минимум
    /// `(1 + num_blocks) * BLOCK_SIZE`: блок 0 получает заголовок,
    /// блоки 1..=num_blocks получают данные в порядке оцифровки.
    ///
    /// Возвращает `num_blocks + 1` при полном успехе и `0`, если данных
    /// нет после исчерпания внутренних повторов. Решение о повторе на
    /// этом уровне остаётся за вызывающим.
    fn read_batch(
        &mut self,
        batch: &mut [u8],
        num_blocks: usize,
    ) -> AdqResult<usize>;

    /// Пишет диагностику источника в лог.
    fn dump_stats(&self) {}
}
