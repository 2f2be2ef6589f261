use std::process::ExitCode;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

fn main() -> ExitCode {
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOGGING_LEVEL.to_string()))
        .init();

    match covid_dash::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
