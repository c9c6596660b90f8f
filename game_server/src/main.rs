#[tokio::main]
async fn main() {
    if let Err(error) = game_server::frameworks::server::run_with_config().await {
        tracing::error!(%error, "server exited with error");
        std::process::exit(1);
    }
}
