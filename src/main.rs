#[tokio::main]
async fn main() -> std::io::Result<()> {
    coord_dashboard::run_with_config().await
}
