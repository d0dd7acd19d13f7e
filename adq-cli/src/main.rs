use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use adq_capture::{CaptureMetrics, ChannelConfig, LiveReader};
use adq_core::{batch_len, BlockSource, MAX_BATCH_BLOCKS};
use adq_replay::{RecordingPlayer, ReplayConfig, ReplayMetrics};
use clap::Parser;
use log::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "adq-cli",
    version = env!("CARGO_PKG_VERSION"),
    about = "Read ADC sample block batches from the driver or a recording",
    long_about = None,
)]
struct Cli {
    /// Символьное устройство драйвера
    #[arg(short, long, default_value = "/dev/adq0")]
    device: PathBuf,
    /// Файл записи вместо живого устройства
    #[arg(short, long)]
    recording: Option<PathBuf>,
    /// Блоков данных в одном запросе
    #[arg(short, long, default_value = "8")]
    blocks: usize,
    /// Сколько батчей прочитать. По умолчанию: до Ctrl+C
    #[arg(short, long)]
    count: Option<u64>,
    /// Дописывать принятые батчи в файл
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value = "5")]
    stats_interval: u64,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if cli.blocks == 0 || cli.blocks > MAX_BATCH_BLOCKS {
        error!("--blocks must be between 1 and {MAX_BATCH_BLOCKS}");
        std::process::exit(1);
    }

    // Источник: живое устройство либо файл записи
    let mut capture_metrics: Option<Arc<CaptureMetrics>> = None;
    let mut replay_metrics: Option<Arc<ReplayMetrics>> = None;

    let mut source: Box<dyn BlockSource> = match &cli.recording {
        Some(path) => {
            let player = RecordingPlayer::new(ReplayConfig {
                recording: path.clone(),
                ..ReplayConfig::default()
            });
            replay_metrics = Some(player.metrics());
            Box::new(player)
        }
        None => {
            let reader = LiveReader::new(ChannelConfig {
                device_path: cli.device.clone(),
                ..ChannelConfig::default()
            });
            capture_metrics = Some(reader.metrics());
            Box::new(reader)
        }
    };

    let mut output = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(f) => Some(f),
            Err(e) => {
                error!("Failed to create output file {path:?}: {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C — принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received — stopping after current batch...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    // Выводим конфигурацию
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    match &cli.recording {
        Some(path) => info!("  Source        : recording {path:?}"),
        None => info!("  Source        : device {:?}", cli.device),
    }
    info!("  Blocks/batch  : {}", cli.blocks);
    info!("  Batch size    : {} B", batch_len(cli.blocks));
    match cli.count {
        Some(n) => info!("  Batch limit   : {n}"),
        None => info!("  Batch limit   : until Ctrl+C"),
    }
    if let Some(path) = &cli.output {
        info!("  Output        : {path:?}");
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match source.start() {
        Ok(true) => {}
        Ok(false) => {
            error!("Start command rejected by source");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start acquisition: {e}");
            std::process::exit(1);
        }
    }

    let session_start = Instant::now();
    let stats_interval = Duration::from_secs(cli.stats_interval);
    let mut last_stats = Instant::now();
    let mut batch = vec![0u8; batch_len(cli.blocks)];
    let mut batches = 0u64;
    let mut exit_code = 0;

    while !stop_flag.load(Ordering::Relaxed) {
        if let Some(limit) = cli.count {
            if batches >= limit {
                break;
            }
        }

        match source.read_batch(&mut batch, cli.blocks) {
            Ok(0) => {
                warn!("No data from source, retrying");
            }
            Ok(_) => {
                batches += 1;

                if let Some(file) = output.as_mut() {
                    if let Err(e) = file.write_all(&batch) {
                        error!("Output write failed: {e}");
                        exit_code = 1;
                        break;
                    }
                }
            }
            Err(e) => {
                error!("Read failed: {e}");
                exit_code = 1;
                break;
            }
        }

        if last_stats.elapsed() >= stats_interval {
            source.dump_stats();
            last_stats = Instant::now();
        }
    }

    match source.stop() {
        Ok(true) => {}
        Ok(false) => warn!("Stop command rejected by source"),
        Err(e) => warn!("Failed to stop acquisition: {e}"),
    }

    // --- Итоговая статистика ---
    if let Some(metrics) = &capture_metrics {
        let summary = metrics.summary(&session_start);
        info!("\n{summary}");

        if metrics.framing_errors.load(Ordering::Relaxed) > 0 {
            warn!(
                "⚠ {} framing errors. Driver and client disagree on the block contract.",
                metrics.framing_errors.load(Ordering::Relaxed)
            );
        }
    } else if let Some(metrics) = &replay_metrics {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("  Duration      : {:.1}s", session_start.elapsed().as_secs_f64());
        info!("  Batches       : {}", metrics.reads_served.load(Ordering::Relaxed));
        info!("  Blocks        : {}", metrics.blocks_served.load(Ordering::Relaxed));
        info!("  File loads    : {}", metrics.loads.load(Ordering::Relaxed));
        info!("  Wraps         : {}", metrics.wraps.load(Ordering::Relaxed));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    match &cli.output {
        Some(path) => info!("✓ Capture complete: {path:?}"),
        None => info!("✓ Capture complete: {batches} batches"),
    }
}
