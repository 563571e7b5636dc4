fn main() {
    if let Err(err) = oasis_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
