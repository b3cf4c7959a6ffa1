fn main() {
    if let Err(e) = selection_monitor_lib::run() {
        eprintln!("Selection monitor failed to start: {}", e);
        std::process::exit(1);
    }
}
