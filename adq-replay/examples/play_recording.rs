//! Пример: синтез файла записи и воспроизведение его батчами
//!
//! Демонстрирует:
//! - запись из целого числа блоков как вход проигрывателя
//! - циклическую отдачу с оборотом курсора
//! - синтез монотонных меток времени
//!
//! Запуск: cargo run -p adq-replay --example play_recording

use std::io::Write;

use adq_core::{batch_len, parse_batch, BlockSource, BLOCK_SIZE};
use adq_replay::{RecordingPlayer, ReplayConfig};
use rand::{Rng, SeedableRng};
use tempfile::NamedTempFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // --- Запись: 40 блоков воспроизводимого шума ---
    let total_blocks = 40usize;
    let mut tmp = NamedTempFile::new()?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let mut block = [0u8; BLOCK_SIZE];

    for _ in 0..total_blocks {
        rng.fill(&mut block[..]);
        tmp.write_all(&block)?;
    }
    tmp.flush()?;

    println!("✓ Recording: {total_blocks} blocks at {:?}", tmp.path());

    // --- Воспроизведение: три батча по 30 блоков, со второго пойдут обороты ---
    let mut player = RecordingPlayer::new(ReplayConfig {
        recording: tmp.path().to_path_buf(),
        ..ReplayConfig::default()
    });
    let metrics = player.metrics();

    player.start()?;

    let num_blocks = 30usize;
    let mut batch = vec![0u8; batch_len(num_blocks)];

    for round in 1..=3 {
        let got = player.read_batch(&mut batch, num_blocks)?;
        let (header, data) = parse_batch(&batch)?;

        println!("✓ Batch {round}: {got} blocks incl. header");
        println!("  Data bytes : {}", data.len());
        println!(
            "  Timestamps : {} .. {}",
            header.timestamps.first().copied().unwrap_or(0),
            header.timestamps.last().copied().unwrap_or(0),
        );
    }

    player.stop()?;

    println!(
        "\nServed {} blocks, wrapped {} times",
        metrics
            .blocks_served
            .load(std::sync::atomic::Ordering::Relaxed),
        metrics.wraps.load(std::sync::atomic::Ordering::Relaxed),
    );

    Ok(())
}
