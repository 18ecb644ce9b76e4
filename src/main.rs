use anyhow::Result;
use muster::cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut app = App::from_args().await?;
    let args = muster::cli::Args::parse_args();

    app.run(args).await?;

    Ok(())
}
