#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = ember_demo::run_from_env() {
        eprintln!("ember-gate: {error}");
        std::process::exit(error.exit_code());
    }
}
