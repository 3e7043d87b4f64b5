//! Posts a single message using the credentials in the environment (or a `.env` file).
//!
//! ```text
//! RUST_LOG=deso_post_client=debug cargo run --example post_message -- "gm"
//! ```

use deso_post_client::Poster;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "IT WORKED!".to_owned());

    let poster = Poster::from_env()?;
    poster.post_message(&message).await?;

    tracing::info!(public_key = poster.client().public_key_base58(), "message committed");
    Ok(())
}
