//! Rent and stop compute sessions

use anyhow::{Context, Result};
use std::path::Path;

use super::Session;
use crate::ui;

/// Rent a listing
pub async fn rent(storage_dir: &Path, demo: bool, id: u64, yes: bool, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    rent_listing(&session, id, yes).await
}

/// Stop renting a listing
pub async fn stop(storage_dir: &Path, demo: bool, id: u64, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    stop_listing(&session, id).await
}

pub async fn rent_listing(session: &Session, id: u64, yes: bool) -> Result<()> {
    let Some(listing) = session.market.listing(id).await? else {
        anyhow::bail!("Listing {} does not exist", id);
    };
    if listing.is_streaming() {
        anyhow::bail!("Listing {} is already rented", id);
    }

    ui::header(&format!("Rent #{}: {}", listing.id, listing.title));
    ui::key_value("Price", &ui::format_rate(listing.flow_rate, &listing.super_token_symbol));
    ui::key_value("Provider", listing.provider.as_str());
    if !yes && !ui::confirm("Start streaming payment?", true)? {
        ui::info("Cancelled");
        return Ok(());
    }

    let spinner = ui::spinner("Starting payment stream...");
    let result = session.market.rent(&listing, &session.renter()).await;
    spinner.finish_and_clear();
    let rental = result.context("Failed to start rental")?;

    ui::success("Rental started");
    ui::key_value("Stream", &ui::abbreviate(rental.stream_tx.value().as_str()));
    ui::key_value("Session", &ui::abbreviate(rental.session_tx.value().as_str()));

    match rental.credentials {
        Some(access) => {
            ui::header("Remote Access");
            ui::key_value("AnyDesk ID", &access.anydesk_id);
            ui::key_value("Password", &access.anydesk_password);
            if !access.note.is_empty() {
                ui::key_value("Note", &access.note);
            }
        }
        None => ui::warning("No remote-access credentials available for this listing"),
    }
    Ok(())
}

pub async fn stop_listing(session: &Session, id: u64) -> Result<()> {
    let Some(listing) = session.market.listing(id).await? else {
        anyhow::bail!("Listing {} does not exist", id);
    };
    if !listing.is_streaming() {
        ui::warning(&format!("Listing {} has no active session", id));
    }

    let spinner = ui::spinner("Stopping payment stream...");
    let result = session.market.stop(&listing).await;
    spinner.finish_and_clear();
    let receipt = result.context("Failed to stop rental")?;

    ui::success("Rental stopped");
    ui::key_value("Stream", &ui::abbreviate(receipt.stream_tx.value().as_str()));
    ui::key_value("Session", &ui::abbreviate(receipt.session_tx.value().as_str()));
    if !receipt.notified {
        ui::info("Provider was not notified");
    }
    Ok(())
}

/// Print the payment history of this session
pub fn print_activity(session: &Session) {
    let activity = session.market.activity();
    ui::header("Payment History");
    if activity.is_empty() {
        ui::info("No payments yet");
        return;
    }
    for entry in activity {
        println!(
            "  {}  {:<5} #{:<3} {:<28} {}  [{:?}]",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            format!("{:?}", entry.kind).to_lowercase(),
            entry.listing_id,
            entry.title,
            ui::format_rate(entry.flow_rate, &entry.token),
            entry.status
        );
    }
}
