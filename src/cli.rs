use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "logo-sync",
    about = "Download organization logos and publish them to R2"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download logos, upload them to R2 and record the URL in MongoDB
    Publish(PublishArgs),
    /// Download logos into the local logos directory only
    Download(DownloadArgs),
    /// Upload a sample image to check R2 credentials
    CheckStore(CheckStoreArgs),
}

/// Which organizations to process. Without flags the command's default applies.
#[derive(Args, Debug)]
pub struct OrgSelectionArgs {
    /// Process a single org by slug (most recent record wins)
    #[arg(long, value_name = "SLUG")]
    pub test_org: Option<String>,

    /// Process specific orgs by slug
    #[arg(long, value_name = "SLUG", num_args = 1..)]
    pub orgs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub selection: OrgSelectionArgs,

    /// Download only; skip the R2 upload and the MongoDB update
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub selection: OrgSelectionArgs,

    /// Re-download even if the file already exists locally
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CheckStoreArgs {
    /// Sample image to upload (defaults to a test-image.jpg near the working directory)
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Actually upload; without this only the target URL is printed
    #[arg(long)]
    pub upload: bool,
}
