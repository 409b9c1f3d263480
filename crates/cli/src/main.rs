use std::process::ExitCode;

fn main() -> ExitCode {
    tradeguard_cli::run()
}
