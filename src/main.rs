use clap::Parser;
use dev_toolbox::utils::{logger, validation::Validate};
use dev_toolbox::{CliConfig, Toolbox, ToolboxConfig, ToolboxError};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let file_config = match ToolboxConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    logger::init_cli_logger(cli.verbose, file_config.logging.format);
    tracing::debug!("CLI config: {:?}", cli);

    let (config, task) = cli.resolve(file_config);
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        exit_with(&e);
    }

    match Toolbox::local().run(task).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{} (category: {:?})", e, e.category());
            exit_with(&e);
        }
    }
}

fn exit_with(e: &ToolboxError) -> ! {
    eprintln!("error: {}", e.user_friendly_message());
    eprintln!("hint: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
