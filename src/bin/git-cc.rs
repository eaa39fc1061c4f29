// Command-line entry point for `git-cc`.
// Usage: git-cc [OPTIONS] [WORDS]... (see `git-cc --help`)

fn main() {
    gitcc::cli::init_tracing();
    gitcc::cli::run();
}
