use clap::Parser;
use projector_link::utils::{logger, validation::Validate};
use projector_link::{Catalog, CliCommand, CliConfig, Overrides, Projector, Result, SerialOpener};

fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config) {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e);
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn run(config: &CliConfig) -> Result<()> {
    config.validate()?;

    let overrides = Overrides::from_pairs(config.overrides.as_slice())?;
    let catalog = Catalog::load(&config.catalog)?;

    match &config.command {
        CliCommand::ListDevices => {
            for device_id in catalog.device_ids() {
                println!("{}", device_id);
            }
        }
        CliCommand::ListCommands => {
            let profile = catalog.resolve(&config.device, &overrides)?;
            for (alias, spec) in profile.command_table()? {
                let actions: Vec<&str> = spec.actions.keys().map(String::as_str).collect();
                if actions.is_empty() {
                    println!("{}", alias);
                } else {
                    println!("{} [{}]", alias, actions.join(", "));
                }
            }
        }
        CliCommand::Send { command, action } => {
            let mut projector = Projector::open(
                &catalog,
                &config.device,
                config.port.as_deref(),
                &overrides,
                &SerialOpener,
            )?;
            let response = projector.dispatch(command, action)?;
            projector.close()?;

            if response.is_empty() {
                tracing::info!("✅ Sent {} {}, no response", command, action);
            } else {
                println!("{}", response.trim());
            }
        }
    }

    Ok(())
}
