#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless browse session.
//!
//! Restores a viewport from a page query string, lets the fetch
//! controller settle on it the way the browse page would, then prints the
//! result cards, the pagination control and the rewritten URL.
//!
//! ```text
//! poi_map_browse --query "centerLat=31.41&centerLng=73.08&zoom=13" --width 1280
//! poi_map_browse --fixture places.json --width 375 --page 3
//! ```
//!
//! Without `--fixture` the hosted content store is queried, which needs
//! `POI_MAP_PROJECT_ID` (and optionally `POI_MAP_DATASET`,
//! `POI_MAP_API_VERSION`, `POI_MAP_USE_CDN`) in the environment.

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use poi_map_content::client::ContentStoreClient;
use poi_map_content::memory::InMemoryStore;
use poi_map_content::{BoundsQueryService, ContentConfig};
use poi_map_pagination::Navigation;
use poi_map_sync::{BrowseSnapshot, FetchController};
use poi_map_url_state::{DEFAULT_CENTER, DEFAULT_ZOOM, MemoryUrlSink, location};
use poi_map_viewport::{BrowseConfig, ViewportClassifier, ViewportState, seed_viewport};
use tokio::sync::watch;

#[derive(Parser)]
#[command(
    name = "poi_map_browse",
    about = "Browse points of interest inside a map viewport"
)]
struct Cli {
    /// Page query string, with or without the leading `?`
    #[arg(long, default_value = "")]
    query: String,

    /// Window width in CSS pixels; selects the mobile, tablet or desktop layout
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Window height in CSS pixels
    #[arg(long, default_value = "800")]
    height: u32,

    /// 1-based page to show once the first results are in
    #[arg(long, default_value = "1")]
    page: u64,

    /// Read places from a JSON array instead of the hosted content store
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Page path the URL is rewritten against
    #[arg(long, default_value = "/")]
    path: String,

    /// Persist exact bounds in the rewritten URL
    #[arg(long)]
    persist_bounds: bool,
}

/// Waits until the snapshot is no longer loading.
async fn settled(
    updates: &mut watch::Receiver<BrowseSnapshot>,
) -> Result<BrowseSnapshot, watch::error::RecvError> {
    Ok(updates.wait_for(|snapshot| !snapshot.loading).await?.clone())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let (service, images): (Arc<dyn BoundsQueryService>, Option<ContentConfig>) =
        if let Some(path) = &cli.fixture {
            let store = InMemoryStore::from_path(path)?;
            log::info!("Loaded {} places from {}", store.len(), path.display());
            (Arc::new(store), None)
        } else {
            let config = ContentConfig::from_env()?;
            log::info!(
                "Querying content store project {} dataset {}",
                config.project_id,
                config.dataset
            );
            (Arc::new(ContentStoreClient::new(config.clone())?), Some(config))
        };

    let device = ViewportClassifier::default().classify(cli.width);
    let mut config = BrowseConfig::for_device(device);
    if cli.persist_bounds {
        config = config.with_persisted_bounds();
    }
    log::info!("Using {device} layout ({} per page)", config.page_size);

    let url_state = poi_map_url_state::decode(&cli.query);
    let viewport = Arc::new(ViewportState::unloaded(
        DEFAULT_CENTER,
        DEFAULT_ZOOM,
        cli.width,
        cli.height,
    ));
    seed_viewport(viewport.as_ref(), &url_state);
    viewport.mark_loaded();

    let sink = Arc::new(MemoryUrlSink::new(location(&cli.path, &url_state)));
    let controller = FetchController::new(
        service,
        viewport.clone(),
        sink.clone(),
        cli.path.clone(),
        config,
    );
    let mut updates = controller.subscribe();

    controller.notify_bounds_changed();
    let mut snapshot = settled(&mut updates).await?;

    if cli.page > 1 {
        if config.append_on_paginate {
            while snapshot.pagination.current_page < cli.page && controller.load_more().is_some() {
                snapshot = settled(&mut updates).await?;
            }
        } else if controller.navigate(Navigation::Direct(cli.page)).is_some() {
            snapshot = settled(&mut updates).await?;
        }
    }

    controller.dispose();

    println!(
        "{} of {} places in view, {} markers",
        snapshot.items.len(),
        snapshot.total_count,
        snapshot.markers.len()
    );
    for line in render::item_lines(&snapshot.items, images.as_ref()) {
        println!("{line}");
    }

    if config.append_on_paginate {
        if (snapshot.items.len() as u64) < snapshot.total_count {
            println!("[see more]");
        }
    } else if let Some(window) = controller.page_window() {
        println!();
        println!("{}", render::page_window(&window));
    }

    println!();
    println!("{}", sink.current());

    Ok(())
}
