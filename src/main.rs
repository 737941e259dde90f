fn main() {
    if let Err(err) = shadowpass::run() {
        eprintln!("Application error: {err}");
    }
}
