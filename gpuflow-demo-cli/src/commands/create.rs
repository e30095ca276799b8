//! Create a listing

use anyhow::{Context, Result};
use gpuflow_lib::market::ListingForm;
use gpuflow_lib::rates::{hourly_rate_to_flow_rate_wei, DEFAULT_DECIMALS};
use std::path::Path;

use super::Session;
use crate::ui;

/// Arguments for `create`; missing values are prompted for
#[derive(Debug, Default, Clone)]
pub struct CreateArgs {
    pub title: Option<String>,
    pub rate: Option<f64>,
    pub token: String,
    pub specs_cid: Option<String>,
}

pub async fn run(storage_dir: &Path, demo: bool, args: CreateArgs, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    create_listing(&session, args).await
}

pub async fn create_listing(session: &Session, args: CreateArgs) -> Result<()> {
    let form = complete_form(args)?;
    ui::header("Create Listing");
    ui::key_value("Title", &form.title);
    ui::key_value("Price", &format!("{} {}/hr", form.rate_per_hour, form.super_token_symbol));
    ui::key_value(
        "Flow rate",
        &format!(
            "{} wei/s",
            hourly_rate_to_flow_rate_wei(form.rate_per_hour, DEFAULT_DECIMALS)
        ),
    );

    let spinner = ui::spinner("Submitting listing...");
    let result = session.market.create_listing(form).await;
    spinner.finish_and_clear();

    let tx = result.context("Failed to create listing")?;
    ui::success("Listing created");
    ui::key_value("Transaction", &ui::abbreviate(tx.value().as_str()));
    Ok(())
}

fn complete_form(args: CreateArgs) -> Result<ListingForm> {
    let title = match args.title {
        Some(title) => title,
        None => ui::input("Machine title")?,
    };
    let rate = match args.rate {
        Some(rate) => rate,
        None => ui::input_with_default("Price (tokens per hour)", "1.0")?
            .trim()
            .parse::<f64>()
            .context("Price must be a number")?,
    };
    let specs_cid = match args.specs_cid {
        Some(cid) => cid,
        None => ui::input("Specs CID")?,
    };
    Ok(ListingForm::new(args.token, rate, title, specs_cid))
}
