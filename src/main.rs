use std::process::ExitCode;

use fe64::board::attack_tables;

fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with protocol output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(err) = attack_tables::init() {
        log::error!("{err}");
        eprintln!("fe64: {err}");
        return ExitCode::FAILURE;
    }

    fe64::uci::run_uci_loop();
    ExitCode::SUCCESS
}
