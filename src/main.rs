#[tokio::main]
async fn main() {
    if let Err(e) = medtrack_lib::run().await {
        eprintln!("medtrack: {e}");
        std::process::exit(1);
    }
}
