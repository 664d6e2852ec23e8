fn main() {
    if let Err(err) = archimate_editor::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
