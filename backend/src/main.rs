use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    if let Err(error) = crates::observability::init_observability("backend") {
        eprintln!("failed to initialise observability: {error:#}");
        std::process::exit(1);
    }

    if let Err(error) = backend::run().await {
        error!(error = ?error, "Backend exited with error");
        std::process::exit(1);
    }
}
