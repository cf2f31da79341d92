#[tokio::main]
async fn main() -> anyhow::Result<()> {
    edgeplane::cli::run_cli().await
}
