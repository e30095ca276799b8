//! Browse listings

use anyhow::Result;
use gpuflow_lib::{Listing, ListingStatus};
use std::path::Path;

use super::Session;
use crate::ui;

/// List every existing listing
pub async fn run(storage_dir: &Path, demo: bool, json: bool, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    print_listings(&session, json).await
}

/// Show a single listing
pub async fn show(storage_dir: &Path, demo: bool, id: u64, json: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    print_listing(&session, id, json).await
}

pub async fn print_listings(session: &Session, json: bool) -> Result<()> {
    let spinner = ui::spinner("Loading listings...");
    let listings = session.market.load_listings().await;
    spinner.finish_and_clear();
    let listings = listings?;

    if json {
        ui::json(&serde_json::to_value(&listings)?);
        return Ok(());
    }

    ui::header("Available Compute");
    if listings.is_empty() {
        ui::info("No listings yet. Create one with `gpuflow-demo create`.");
        return Ok(());
    }

    for listing in &listings {
        print_row(listing);
    }

    let renter = session.renter();
    let mine = session.market.active_streams(&listings, &renter);
    if !mine.is_empty() {
        ui::header("Your Active Streams");
        for listing in &mine {
            print_row(listing);
        }
    }
    Ok(())
}

pub async fn print_listing(session: &Session, id: u64, json: bool) -> Result<()> {
    let Some(listing) = session.market.listing(id).await? else {
        anyhow::bail!("Listing {} does not exist", id);
    };

    if json {
        ui::json(&serde_json::to_value(&listing)?);
        return Ok(());
    }

    ui::header(&format!("Listing #{}", listing.id));
    ui::key_value("Title", &listing.title);
    ui::key_value("Provider", listing.provider.as_str());
    ui::key_value("Price", &ui::format_rate(listing.flow_rate, &listing.super_token_symbol));
    ui::key_value("Flow rate", &format!("{} wei/s", listing.flow_rate));
    ui::key_value("Specs CID", &listing.specs_cid);
    ui::key_value("Status", listing.status.as_str());
    if listing.is_streaming() {
        ui::key_value("Renter", listing.active_renter.as_str());
    }
    Ok(())
}

fn print_row(listing: &Listing) {
    let status = match listing.status {
        ListingStatus::Idle => "available",
        ListingStatus::Streaming => "rented",
    };
    println!(
        "  #{:<3} {:<28} {:>22}  {:<9}  {}",
        listing.id,
        listing.title,
        ui::format_rate(listing.flow_rate, &listing.super_token_symbol),
        status,
        ui::abbreviate(listing.provider.as_str())
    );
}
