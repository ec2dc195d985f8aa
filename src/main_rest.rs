use harbor_dockergen::start_rest;

#[tokio::main]
async fn main() {
    if let Err(e) = start_rest().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
