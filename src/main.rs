use herd_immunity::runner::run_with_args;

fn main() {
    if let Err(error) = run_with_args() {
        eprintln!("herd-immunity failed: {error}");
        std::process::exit(1);
    }
}
