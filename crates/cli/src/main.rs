use std::process::ExitCode;

fn main() -> ExitCode {
    highfive_cli::run()
}
