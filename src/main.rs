use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use photo_feed::{cli, config, error, feed, logger};
use photo_feed_common::{catalog, text};
use cli::{Cli, Commands, OptionKind};
use config::Config;
use error::Result;
use feed::{FeedOrchestrator, FetchOutcome};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Search { filters, pages, per_page, output } => {
            println!("🐕 photo-feed - 写真検索\n");

            let criteria = filters.to_criteria()?;
            let orchestrator = FeedOrchestrator::from_config(&config)?;
            if let Some(per_page) = per_page {
                orchestrator.set_per_page(per_page)?;
            }

            for page in 1..=pages.max(1) {
                if page > 1 {
                    orchestrator.increment_page();
                }

                println!("[{}/{}] ページ{}を取得中...", page, pages.max(1), page);
                match orchestrator.fetch(&criteria).await? {
                    FetchOutcome::Preloading(mut handle) => {
                        let bar = ProgressBar::new(handle.photos() as u64);
                        bar.set_style(
                            ProgressStyle::with_template("  {bar:30} {pos}/{len} 枚プリロード済み")
                                .unwrap_or_else(|_| ProgressStyle::default_bar()),
                        );
                        while let Some(size) = handle.next_chunk().await {
                            bar.inc(size as u64);
                        }
                        bar.finish();
                        let summary = handle.wait().await?;
                        println!("✔ {}枚を追加（{}チャンク）\n", summary.committed, summary.chunks);
                    }
                    FetchOutcome::Exhausted => {
                        println!("これ以上の写真はありません\n");
                        break;
                    }
                    FetchOutcome::InFlight => {}
                }
            }

            let photos = orchestrator.current_bucket();

            if let Some(output) = output {
                let json = serde_json::to_string_pretty(&photos)?;
                std::fs::write(&output, json)?;
                println!("✔ 結果を保存: {}", output.display());
            } else {
                for photo in photos.iter().take(20) {
                    println!(
                        "  {} {} - {} ({})",
                        photo.upload_date_label().unwrap_or_default(),
                        text::truncate(&photo.title, 40, text::DEFAULT_SUFFIX),
                        photo.author,
                        photo.image_url
                    );
                }
                if photos.len() > 20 {
                    println!("  ...他{}枚", photos.len() - 20);
                }
            }

            println!("\n✅ 合計{}枚", photos.len());
        }

        Commands::Options { kind } => {
            let options = match kind {
                OptionKind::Licenses => catalog::licenses(),
                OptionKind::Colors => catalog::colors(),
            };
            for option in options {
                println!("  {:>3}  {}", option.id, option.label);
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  API URL: {}", config.api_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  デフォルト検索語: {}", config.default_search_text);
                println!("  1ページの件数: {}", config.per_page);
                println!("  チャンクサイズ: {}", config.preload_chunk_size);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
