use clap::Parser;
use synthetics::core::CodeSource;
use synthetics::utils::{logger, validation::Validate};
use synthetics::{CanaryCodeLoader, CliConfig, CodeLocation, LocalCodeSource, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting synthetics-code");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let source = build_source(&config).await?;
    let loader = CanaryCodeLoader::new(source);

    match loader.run().await {
        Ok((code, entries)) => {
            println!("✅ {} ({} bytes)", code.location, code.len());
            for entry in entries {
                println!("  {}", entry);
            }
        }
        Err(e) => {
            tracing::error!("Failed to load canary code: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

async fn build_source(config: &TomlConfig) -> anyhow::Result<Box<dyn CodeSource>> {
    match CodeLocation::from_config(config)? {
        CodeLocation::File(path) => Ok(Box::new(LocalCodeSource::new(path))),
        #[cfg(feature = "s3")]
        CodeLocation::S3 { bucket, key } => {
            use synthetics::adapters::s3::build_client;
            use synthetics::core::ConfigProvider as _;

            let client = build_client(config.code.s3_region.as_deref()).await;
            let mut source = synthetics::S3CodeSource::new(client, bucket, key)
                .with_retry_config(config.retry_config());
            if !config.retry_codes().is_empty() {
                source = source.with_retry_codes(config.retry_codes().to_vec());
            }
            Ok(Box::new(source))
        }
        #[cfg(not(feature = "s3"))]
        CodeLocation::S3 { .. } => {
            anyhow::bail!("S3 code sources require the `s3` feature")
        }
    }
}
