use odbcprobe::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // findings never change the exit status, only tool errors do
    if let Err(e) = cli::start().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
