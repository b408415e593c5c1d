use clap::Parser;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use fridgenutri_backend::api;
use fridgenutri_backend::config::AppConfig;
use fridgenutri_backend::prices::PriceAggregator;
use fridgenutri_backend::providers::openai::openai::OpenAiVisionProvider;
use fridgenutri_backend::providers::traits::VisionProvider;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    println!("Starting FridgeNutri backend on {}", addr);

    let vision: Arc<dyn VisionProvider> = Arc::new(OpenAiVisionProvider::new(
        config.openai_api_key.clone(),
        config.vision_model.clone(),
        config.completions_url.clone(),
    ));
    let prices = Arc::new(PriceAggregator::with_default_sources(
        config.storefront_timeout,
        config.price_cache_ttl,
    )?);

    println!("Initializing API routes...");

    let app = api::create_api(vision, prices);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("Server successfully bound to {}", addr);
    println!("Ready to accept connections!");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
