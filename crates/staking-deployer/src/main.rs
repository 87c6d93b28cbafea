use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    staking_deployer::start(std::env::args()).await
}
