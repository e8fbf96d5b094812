mod cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(err) = cli::run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
