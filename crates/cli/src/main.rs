fn main() {
    if let Err(e) = xcbridge_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
