use std::env;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use idea_pipeline_cli::extract::Extractor;
use idea_pipeline_cli::render::{ChromeRenderer, RenderOptions};
use idea_pipeline_cli::translate::{
    LibreTranslateClient, TranslatedContent, Translator, TranslatorConfig, DEFAULT_ENDPOINT,
};
use idea_pipeline_cli::utils;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to extract
    #[arg(short, long)]
    url: String,

    /// Navigation timeout in milliseconds
    #[arg(short, long, default_value_t = 60_000)]
    timeout_ms: u64,

    /// Source language code
    #[arg(long, default_value = "en")]
    source_lang: String,

    /// Target language code
    #[arg(long, default_value = "ko")]
    target_lang: String,

    /// Where to write the JSON result
    #[arg(short, long, default_value = "result.json")]
    output: String,

    /// Skip translation
    #[arg(short, long)]
    skip_translate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,idea_pipeline_cli=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let options = RenderOptions::default().with_timeout(Duration::from_millis(args.timeout_ms));
    let extractor = Extractor::new(Arc::new(ChromeRenderer::new()), options);

    let page = match extractor.extract(&args.url).await {
        Ok(page) => page,
        Err(e) => {
            eprintln!("❌ Extraction failed: {e}");
            return Err(e.into());
        }
    };

    if args.skip_translate {
        utils::save_json(&page.report(), &args.output)?;
        return Ok(());
    }

    let endpoint = env::var("TRANSLATE_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let api_key = env::var("TRANSLATE_API_KEY").ok();
    let backend = LibreTranslateClient::new(&endpoint, api_key)?;
    let translator = Translator::new(
        Arc::new(backend),
        TranslatorConfig {
            source_lang: args.source_lang.clone(),
            target_lang: args.target_lang.clone(),
            ..TranslatorConfig::default()
        },
    );

    let content = match translator.translate_content(&page).await {
        Ok(content) => content,
        Err(e) => {
            eprintln!("❌ Translation unavailable, keeping original text: {e}");
            TranslatedContent::untranslated(page, &args.source_lang, &args.target_lang)
        }
    };

    utils::save_json(&content.report(), &args.output)?;
    utils::save_text(&utils::bilingual_summary(&content), "summary.txt")?;

    if !content.is_complete() {
        eprintln!("⚠️ {} field(s) left untranslated.", content.metadata.failed_fields.len());
    }

    Ok(())
}
