//! Пример: сборка и разбор батча через кодек заголовка
//!
//! Демонстрирует:
//! - запись заголовка в блок 0 через BatchHeaderExt
//! - разбор батча обратно в заголовок и срез данных
//! - раскладку первых байт заголовочного блока

use adq_core::{batch_len, parse_batch, BatchHeaderExt, BLOCK_SIZE, SAMPLE_INTERVAL_NS};
use adq_types::BatchHeader;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_blocks = 4usize;
    let mut batch = vec![0u8; batch_len(num_blocks)];

    // --- Блоки данных: воспроизводимый шум ---
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for byte in &mut batch[BLOCK_SIZE..] {
        *byte = rng.gen();
    }

    // --- Заголовок: метки времени с номинальным шагом ---
    let timestamps: Vec<u64> = (0..num_blocks as u64)
        .map(|i| i * SAMPLE_INTERVAL_NS)
        .collect();
    let header = BatchHeader::new(timestamps);

    match header.write_to(&mut batch[..BLOCK_SIZE]) {
        Ok(()) => println!("✓ Header written"),
        Err(e) => {
            eprintln!("✗ Header write failed: {e}");
            return Err(Box::new(e));
        }
    }

    // --- Разбор обратно ---
    let (parsed, data) = parse_batch(&batch)?;

    println!("✓ Batch parsed");
    println!("  Blocks     : {}", parsed.num_blocks);
    println!("  Data bytes : {}", data.len());
    println!("  Timestamps : {:?}", parsed.timestamps);

    // --- Сырые байты префикса ---
    println!("\nHeader block prefix:");
    println!("  magic      : {:02X?}", &batch[0..4]);
    println!("  num_blocks : {:02X?}", &batch[4..8]);

    Ok(())
}
