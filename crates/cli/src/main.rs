use std::process::ExitCode;

fn main() -> ExitCode {
    fitnexus_cli::run()
}
