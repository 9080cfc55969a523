use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = freight_entitlements::run().await {
        error!("Server exited with error: {}", error);
        std::process::exit(1);
    }
}
