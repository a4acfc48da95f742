use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pinmark_cli::cli::app::run().await
}
