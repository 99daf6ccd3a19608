fn main() {
    if let Err(err) = driftfield::app::run() {
        eprintln!("startup failed: {err}");
        std::process::exit(1);
    }
}
