use migrate_lfs::presentation::cli::CliApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = CliApp::new();
    app.run().await
}
