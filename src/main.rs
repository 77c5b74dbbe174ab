use anyhow::Context;
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use photo_squeeze::batch::{run_all, BatchSummary};
use photo_squeeze::cli::{Args, Commands};
use photo_squeeze::constants::{
    DEFAULT_MAX_DIMENSION, DEFAULT_MAX_OUTPUT_SIZE_MB, DEFAULT_QUALITY, PROGRESS_BAR_TEMPLATE,
};
use photo_squeeze::export::{export_all, ExportOutcome};
use photo_squeeze::formats::{guess_media_type, OutputFormat};
use photo_squeeze::info::get_image_info;
use photo_squeeze::item::{ItemId, ItemStatus};
use photo_squeeze::options::{Options, TargetPreset};
use photo_squeeze::store::{collect_image_files, ItemStore};
use photo_squeeze::utils::{calculate_compression_ratio, format_file_size};
use photo_squeeze::{error, info, logger, success, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Compress {
            inputs,
            output,
            preset,
            quality,
            format,
            max_size_mb,
            max_dimension,
            no_worker,
            recursive,
            stdin,
            quiet,
            verbose,
        } => {
            logger::set_quiet_mode(quiet);
            logger::set_verbose_mode(verbose);

            let output_format = match format {
                Some(f) => OutputFormat::from_str(&f)?,
                None => OutputFormat::Jpeg,
            };
            let options = Options::new(
                max_size_mb.unwrap_or(DEFAULT_MAX_OUTPUT_SIZE_MB),
                max_dimension.unwrap_or(DEFAULT_MAX_DIMENSION),
                !no_worker,
                output_format,
                quality.unwrap_or(DEFAULT_QUALITY),
            )?;
            let preset = TargetPreset::from_str(&preset)
                .with_context(|| format!("unknown preset '{}'", preset))?;

            run_compress(inputs, output, options, preset, recursive, stdin).await?;
        }
        Commands::Info { input } => {
            get_image_info(&input)?;
        }
    }

    Ok(())
}

async fn run_compress(
    inputs: Vec<String>,
    output: PathBuf,
    options: Options,
    preset: TargetPreset,
    recursive: bool,
    stdin: bool,
) -> anyhow::Result<()> {
    let store = ItemStore::new();

    let mut paths = Vec::new();
    for input in &inputs {
        paths.extend(collect_image_files(input, recursive)?);
    }
    store.add_paths(&paths)?;

    if stdin {
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .context("failed to read pasted image from stdin")?;
        let media_type = guess_media_type(&bytes);
        let id = store.add_pasted(media_type, bytes);
        photo_squeeze::verbose!("Added pasted image {} ({})", id, media_type);
    }

    if store.is_empty() {
        warn!("No image files found in the input paths");
        return Ok(());
    }

    info!("🚀 Compressing {} images...", store.len());

    let bars = create_progress_bars(&store);

    let run = run_all(&store, &options, preset);
    tokio::pin!(run);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let summary = loop {
        tokio::select! {
            result = &mut run => break result?,
            _ = ticker.tick() => refresh_progress(&store, &bars),
        }
    };
    refresh_progress(&store, &bars);

    print_summary(&store, &summary);

    match export_all(&store, &options, &output)? {
        ExportOutcome::Nothing => {
            warn!("Nothing to export");
        }
        ExportOutcome::Single(path) => {
            success!("Saved {}", path.display());
        }
        ExportOutcome::Archive { path, entries } => {
            success!("Bundled {} images into {}", entries, path.display());
        }
    }

    Ok(())
}

fn create_progress_bars(store: &ItemStore) -> HashMap<ItemId, ProgressBar> {
    let multi = if logger::is_quiet() {
        MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
    } else {
        MultiProgress::new()
    };
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_BAR_TEMPLATE)
        .expect("Invalid progress template");

    store
        .snapshot()
        .into_iter()
        .map(|item| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(style.clone());
            bar.set_message(item.original.name.clone());
            (item.id, bar)
        })
        .collect()
}

fn refresh_progress(store: &ItemStore, bars: &HashMap<ItemId, ProgressBar>) {
    for item in store.snapshot() {
        let Some(bar) = bars.get(&item.id) else {
            continue;
        };
        if bar.is_finished() {
            continue;
        }

        bar.set_position(item.progress as u64);
        match item.status {
            ItemStatus::Done => bar.finish_with_message(format!("✅ {}", item.original.name)),
            ItemStatus::Error => bar.abandon_with_message(format!("❌ {}", item.original.name)),
            _ => {}
        }
    }
}

fn print_summary(store: &ItemStore, summary: &BatchSummary) {
    info!("\n📊 Batch Compression Summary:");
    info!(
        "  📁 Total files: {} ({} already done)",
        summary.total, summary.skipped
    );
    info!("  ✅ Succeeded: {}", summary.succeeded);
    if summary.failed > 0 {
        info!("  ❌ Failed: {}", summary.failed);
    }
    info!(
        "  📊 Total original size: {}",
        format_file_size(summary.total_bytes_before)
    );
    info!(
        "  📊 Total compressed size: {}",
        format_file_size(summary.total_bytes_after)
    );
    info!(
        "  🎯 Overall compression ratio: {:.1}%",
        calculate_compression_ratio(summary.total_bytes_before, summary.total_bytes_after)
    );
    info!("  ⏱️  Total time: {:?}", summary.elapsed);

    for item in store.snapshot() {
        if item.status == ItemStatus::Error {
            error!(
                "{}: {}",
                item.original.name,
                item.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
