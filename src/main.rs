use anyhow::Context;
use clap::Parser;
use guesstimate_cards::core::pipeline::{load_questions, load_template};
use guesstimate_cards::core::{ConfigProvider, Storage};
use guesstimate_cards::utils::error::{CardError, ErrorSeverity};
use guesstimate_cards::utils::{logger, validation::Validate};
use guesstimate_cards::{
    CardConfig, CardEngine, CardPipeline, CliConfig, LocalStorage, TrueTypeFont,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting guesstimate-cards");

    let config = args
        .resolve()
        .with_context(|| format!("Failed to load configuration '{}'", args.config))?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    let storage = LocalStorage::new(".");

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no cards will be rendered");
        print_intervals(&storage, &config).await;
        return Ok(());
    }

    if args.inspect_template {
        match load_template(&storage, &config).await {
            Ok((template, regions)) => {
                println!("Template {}x{}", template.width(), template.height());
                for (label, rects) in regions.iter() {
                    println!("{:>10}: {} box(es)", label, rects.len());
                    for rect in rects {
                        println!(
                            "{:>10}  x={} y={} w={} h={}",
                            "", rect.x, rect.y, rect.width, rect.height
                        );
                    }
                }
                return Ok(());
            }
            Err(e) => exit_with(&e),
        }
    }

    let font = match load_font(&storage, &config).await {
        Ok(font) => font,
        Err(e) => exit_with(&e),
    };
    tracing::info!("🔤 Font '{}' loaded", font.name());

    let output_dir = config.output_dir().to_string();
    let pipeline = match CardPipeline::open(storage, config, font).await {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };
    let engine = CardEngine::new(pipeline);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Card generation completed successfully!");
            println!(
                "✅ Rendered {} card(s) into {}",
                summary.cards.len(),
                output_dir
            );
            if summary.skipped_field_count() > 0 {
                println!(
                    "⚠️ {} field(s) could not be drawn, see the log for details",
                    summary.skipped_field_count()
                );
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

async fn load_font(
    storage: &LocalStorage,
    config: &CardConfig,
) -> Result<TrueTypeFont, CardError> {
    let path = &config.font.path;
    let bytes = storage
        .read_file(path)
        .await
        .map_err(|e| CardError::FontError {
            message: format!("cannot read '{}': {}", path, e),
        })?;
    TrueTypeFont::from_bytes(path.as_str(), bytes)
}

async fn print_intervals(storage: &LocalStorage, config: &CardConfig) {
    let questions = load_questions(storage, config).await;
    println!("{} question(s) in {}", questions.len(), config.input_path());
    for (index, question) in questions.iter().enumerate() {
        println!("#{} [{}] {}", index, question.category, question.prompt);
        for (label, text) in question.intervals.iter() {
            println!("    {:>4}: {}", label.as_str(), text);
        }
    }
}

fn exit_with(e: &CardError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Card generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
