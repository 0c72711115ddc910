use sockhub::{
    error::HubResult,
    hub::{client, server},
    logger::{init_logger, LoggerType},
    opts::{Action, Opts},
};

#[tokio::main]
async fn main() -> HubResult<()> {
    let opts = Opts::from_env();
    run(&opts).await?;

    Ok(())
}

async fn run(opts: &Opts) -> HubResult<()> {
    let level_filter = if opts.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    match &opts.action {
        Action::Daemon => {
            init_logger(LoggerType::Server, level_filter)?;
            server::start_server().await?;
        }
        Action::Command(command) => {
            init_logger(LoggerType::Command, level_filter)?;
            client::send_command(command).await?;
        }
        Action::Client(client_opts) => {
            init_logger(LoggerType::Client, level_filter)?;
            client::start_client(client_opts).await?;
        }
    };

    Ok(())
}
