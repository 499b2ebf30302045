use mstest_runner::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    mstest_runner::init();

    match cli::run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
