#[tokio::main]
async fn main() {
    if let Err(err) = route_weather::cli::run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
