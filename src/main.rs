mod client;
mod error;
mod logging;
mod models;
mod popup;
mod tconst;
mod ui;

use anyhow::Result;
use clap::Parser;

use client::{build_http, MetadataClient, SimilarityClient, DEFAULT_BASE_URL};
use popup::Popup;
use ui::Ui;

const DEFAULT_LIMIT: u32 = 20;

#[derive(Parser)]
#[command(name = "reelkin")]
#[command(about = "A terminal popup that finds movies similar to the one you're looking at")]
struct Args {
    #[arg(help = "URL of the movie page in the active tab")]
    url: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL, help = "Base URL of the recommendation service")]
    base_url: String,

    #[arg(long, default_value_t = DEFAULT_LIMIT, help = "How many similar movies to request")]
    limit: u32,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v debug, -vv trace)")]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let http = build_http()?;
    let metadata = MetadataClient::new(http.clone(), &args.base_url);
    let similarity = SimilarityClient::new(http, &args.base_url);
    let ui = Ui::new()?;

    let mut popup = Popup::new(metadata, similarity, ui, args.limit);
    popup.run(args.url.as_deref()).await
}
