mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use org_logo_sync::config::{Config, StoreConfig};
use org_logo_sync::db::{MongoOrganizations, Selection};
use org_logo_sync::fetch::Downloader;
use org_logo_sync::s3::{check_store, find_sample_image, S3Client};
use org_logo_sync::sync::{LogoSync, RunMode};

use cli::{CheckStoreArgs, Cli, Commands, OrgSelectionArgs};

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_tracing()?;

    match cli.command {
        Commands::Publish(args) => {
            let (config, store_config) =
                Config::with_store_from_env().context("Failed to load configuration")?;
            let dry_run = args.dry_run || config.dry_run;

            info!(bucket = %store_config.bucket, dry_run, "Configuration loaded");

            let orgs = MongoOrganizations::connect(&config).await?;
            let store = S3Client::new(&store_config).context("Failed to initialize R2 client")?;
            let mode = RunMode::Publish {
                store: &store,
                dry_run,
            };

            run_sync(&config, &orgs, mode, args.selection).await
        }
        Commands::Download(args) => {
            let config = Config::from_env().context("Failed to load configuration")?;
            info!(force = args.force, "Configuration loaded");

            let orgs = MongoOrganizations::connect(&config).await?;
            let mode = RunMode::DownloadOnly { force: args.force };

            run_sync(&config, &orgs, mode, args.selection).await
        }
        Commands::CheckStore(args) => run_check_store(args).await,
    }
}

async fn run_sync(
    config: &Config,
    orgs: &MongoOrganizations,
    mode: RunMode<'_>,
    args: OrgSelectionArgs,
) -> Result<()> {
    let selection = Selection::from_flags(args.test_org, args.orgs, mode.default_selection());
    let sync = LogoSync::new(
        orgs,
        Downloader::new()?,
        config.logos_dir.clone(),
        config.sleep_between,
        mode,
    );

    // Per-record failures are reported in the summary, not the exit status.
    sync.run(&selection).await?;
    Ok(())
}

async fn run_check_store(args: CheckStoreArgs) -> Result<()> {
    let store_config = StoreConfig::from_env().context("Failed to load R2 configuration")?;
    let store = S3Client::new(&store_config).context("Failed to initialize R2 client")?;
    let sample = find_sample_image(args.file)?;

    info!(
        bucket = %store.bucket_name(),
        endpoint = %store.endpoint(),
        upload = args.upload,
        "Checking R2 store"
    );

    let publication = check_store(&store, &sample, args.upload)
        .await
        .context("R2 upload failed; check the access key, secret, account id and bucket name")?;

    if publication.uploaded {
        info!(public_url = %publication.public_url, "[success] Upload completed");
    } else {
        info!(
            public_url = %publication.public_url,
            "[dry-run] Pass --upload to actually upload"
        );
    }
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,org_logo_sync=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
