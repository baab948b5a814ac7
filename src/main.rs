fn main() {
    if let Err(err) = build_visualizer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
