//! foodshare - command line front end
//!
//! - `classify`: analyze one food photo and print the structured result
//! - `listings`: browse the demo catalog (list or map pins)
//! - `demo`: post a photo as the signed-in user, claim a nearby listing and
//!   open the pickup chat

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use foodshare::{
    encode_image, now_ms, place_pins, seed, Analysis, AnalysisState, Catalog, ClassificationClient,
    ClassifierConfig, Inbox, ListingDraft, ListingFilter, PickupWindow, QUICK_REPLIES,
};

#[path = "../ui.rs"]
mod ui;

const MANUAL_ENTRY_NOTICE: &str = "Failed to analyze image. Please fill details manually.";

#[derive(Parser, Debug)]
#[command(name = "foodshare", author, version, about)]
struct Args {
    /// Config file (JSON or .toml); defaults to $FOODSHARE_CONFIG.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE", global = true)]
    ui: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a food photo.
    Classify {
        /// Path to the image.
        image: PathBuf,
        /// Override the sniffed MIME type.
        #[arg(long, value_name = "TYPE")]
        mime_type: Option<String>,
    },
    /// Print the demo catalog.
    Listings {
        /// Filter chip: All, Veg, Halal, or a category/tag.
        #[arg(long, default_value = "All")]
        filter: String,
        /// Only listings that are available and not expired.
        #[arg(long)]
        available: bool,
        /// Print map pins instead of listings.
        #[arg(long)]
        map: bool,
    },
    /// End-to-end run: post, claim, chat.
    Demo {
        /// Photo to post.
        #[arg(long, value_name = "PATH")]
        image: PathBuf,
        /// Pickup window in hours (1, 2, 4, 12, 24).
        #[arg(long, default_value_t = 2)]
        hours: u32,
        /// Listing to claim after posting.
        #[arg(long, default_value = "f1")]
        claim: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let is_tty = std::io::stderr().is_terminal();
    let stdout_is_tty = std::io::stdout().is_terminal();
    let ui = ui::Ui::from_args(Some(&args.ui), is_tty, !stdout_is_tty);

    match args.command {
        Command::Classify { image, mime_type } => {
            let client = build_client(args.config.as_ref())?;
            run_classify(&ui, &client, image, mime_type)
        }
        Command::Listings {
            filter,
            available,
            map,
        } => run_listings(&filter, available, map),
        Command::Demo {
            image,
            hours,
            claim,
        } => {
            let client = build_client(args.config.as_ref())?;
            run_demo(&ui, &client, image, hours, &claim)
        }
    }
}

fn build_client(config: Option<&PathBuf>) -> Result<ClassificationClient> {
    let cfg = match config {
        Some(path) => ClassifierConfig::from_path(path)?,
        None => ClassifierConfig::load()?,
    };
    ClassificationClient::from_config(&cfg)
}

fn analyze(
    ui: &ui::Ui,
    client: &ClassificationClient,
    image: PathBuf,
    mime_type: Option<String>,
) -> Result<(AnalysisState, String)> {
    let payload = {
        let _stage = ui.stage("Read photo");
        encode_image(&image)?
    };
    let payload = match mime_type {
        Some(mime_type) => payload.with_mime_type(mime_type),
        None => payload,
    };
    let data_url = payload.to_data_url();

    let analysis = Analysis::new();
    analysis.start(client, payload)?;
    let state = ui.follow(&analysis, "AI is analyzing freshness")?;
    Ok((state, data_url))
}

fn run_classify(
    ui: &ui::Ui,
    client: &ClassificationClient,
    image: PathBuf,
    mime_type: Option<String>,
) -> Result<()> {
    let (state, _) = analyze(ui, client, image, mime_type)?;
    match state {
        AnalysisState::Classified(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        AnalysisState::Failed(err) => {
            log::error!("{}", err);
            eprintln!("{}", MANUAL_ENTRY_NOTICE);
            std::process::exit(2);
        }
        other => Err(anyhow!("analysis ended in unexpected state {:?}", other)),
    }
}

fn run_listings(filter: &str, available: bool, map: bool) -> Result<()> {
    let now = now_ms()?;
    let catalog = Catalog::new(seed::mock_items(now));
    let filter = ListingFilter::parse(filter);
    let items = if available {
        catalog.available_filtered(&filter, now)
    } else {
        catalog.filtered(&filter)
    };

    if map {
        println!("{}", serde_json::to_string_pretty(&place_pins(items))?);
    } else {
        println!("{}", serde_json::to_string_pretty(&items)?);
    }
    Ok(())
}

fn run_demo(
    ui: &ui::Ui,
    client: &ClassificationClient,
    image: PathBuf,
    hours: u32,
    claim: &str,
) -> Result<()> {
    let user = seed::current_user();
    let now = now_ms()?;
    let mut catalog = Catalog::new(seed::mock_items(now));
    let mut inbox = Inbox::new(user.id.clone());

    let mut draft = ListingDraft::new();
    draft.pickup_window = PickupWindow::from_hours(hours)?;

    let (state, data_url) = analyze(ui, client, image, None)?;
    draft.image_url = Some(data_url);
    match state {
        AnalysisState::Classified(result) => draft.apply_classification(&result),
        AnalysisState::Failed(err) => {
            log::warn!("{}", err);
            eprintln!("{}", MANUAL_ENTRY_NOTICE);
            draft.title = "Shared food".to_string();
        }
        other => return Err(anyhow!("analysis ended in unexpected state {:?}", other)),
    }
    draft.safety_confirmed = true;

    let posted = draft.submit(&user, now)?;
    let posted_id = posted.id.clone();
    catalog.post(posted)?;

    let claimed = catalog
        .claim(claim, &user.id)
        .with_context(|| format!("claim listing '{}'", claim))?
        .clone();
    let session_id = inbox.open_for_item(&claimed, now).id.clone();
    inbox.send(&session_id, QUICK_REPLIES[0], now)?;
    inbox.send(&session_id, QUICK_REPLIES[1], now)?;

    let summary = serde_json::json!({
        "posted": catalog.get(&posted_id),
        "claimed": claimed,
        "chat": inbox.session(&session_id),
        "pins": place_pins(catalog.items()),
        "classifier": client.backend_name(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
