#[tokio::main]
async fn main() {
    if let Err(e) = accredit_lib::run().await {
        eprintln!("accredit: {e}");
        std::process::exit(1);
    }
}
