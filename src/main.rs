fn main() {
    if let Err(e) = freshcrop::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
