//! Rate conversion helper

use anyhow::Result;
use gpuflow_lib::rates::{hourly_rate_to_flow_rate_wei, per_hour_to_per_sec, MAX_DECIMALS};

use crate::ui;

pub fn run(tokens_per_hour: f64, decimals: usize, json: bool) -> Result<()> {
    if !tokens_per_hour.is_finite() || tokens_per_hour < 0.0 {
        anyhow::bail!("Rate must be a non-negative number");
    }
    if decimals > MAX_DECIMALS {
        anyhow::bail!("Token decimals must be at most {}, got {}", MAX_DECIMALS, decimals);
    }
    let per_sec = per_hour_to_per_sec(tokens_per_hour);
    let wei = hourly_rate_to_flow_rate_wei(tokens_per_hour, decimals);

    if json {
        ui::json(&serde_json::json!({
            "tokensPerHour": tokens_per_hour,
            "tokensPerSecond": per_sec,
            "flowRateWeiPerSecond": wei,
            "decimals": decimals,
        }));
        return Ok(());
    }

    ui::header("Flow Rate");
    ui::key_value("Per hour", &tokens_per_hour.to_string());
    ui::key_value("Per second", &per_sec.to_string());
    ui::key_value("Wei per second", &wei);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_decimals() {
        assert!(run(1.0, usize::MAX, true).is_err());
        assert!(run(1.0, MAX_DECIMALS + 1, true).is_err());
        assert!(run(1.0, MAX_DECIMALS, true).is_ok());
    }
}
