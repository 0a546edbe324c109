#[tokio::main]
async fn main() {
    if let Err(e) = hms_lib::run().await {
        eprintln!("hms: {e}");
        std::process::exit(1);
    }
}
