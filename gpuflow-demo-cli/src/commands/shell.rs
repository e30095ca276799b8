//! Interactive marketplace session
//!
//! Keeps one marketplace alive across commands, so demo-mode state and
//! payment history survive between actions.

use anyhow::Result;
use console::Term;
use std::io::BufRead;
use std::path::Path;

use super::create::{self, CreateArgs};
use super::session as rental;
use super::{listings, status, Session};
use crate::ui;

const HELP: &[(&str, &str)] = &[
    ("listings", "List available compute"),
    ("show <id>", "Show one listing"),
    ("create [rate cid title..]", "Create a listing (prompts when arguments are missing)"),
    ("rent <id>", "Rent a listing"),
    ("stop <id>", "Stop renting a listing"),
    ("history", "Show payment history"),
    ("status", "Show backend and demo-mode status"),
    ("reset", "Leave demo mode and retry the backends"),
    ("clear", "Clear the screen"),
    ("help", "Show this help"),
    ("quit", "Leave the shell"),
];

enum Flow {
    Continue,
    Quit,
}

pub async fn run(storage_dir: &Path, demo: bool, _verbose: bool) -> Result<()> {
    let session = Session::open(storage_dir, demo)?;
    let interactive = Term::stdout().is_term();

    ui::header("gpuflow marketplace shell");
    ui::info("Type `help` for commands, `quit` to leave.");

    if interactive {
        loop {
            let line = ui::input("gpuflow")?;
            if let Flow::Quit = dispatch(&session, &line, true).await {
                break;
            }
        }
    } else {
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            if let Flow::Quit = dispatch(&session, &line, false).await {
                break;
            }
        }
    }
    Ok(())
}

async fn dispatch(session: &Session, line: &str, interactive: bool) -> Flow {
    match execute(session, line, interactive).await {
        Ok(flow) => flow,
        Err(err) => {
            ui::error(&format!("{:#}", err));
            Flow::Continue
        }
    }
}

async fn execute(session: &Session, line: &str, interactive: bool) -> Result<Flow> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };
    let rest: Vec<&str> = words.collect();

    match command {
        "listings" | "ls" => listings::print_listings(session, false).await?,
        "show" => listings::print_listing(session, parse_id(&rest)?, false).await?,
        "create" => create::create_listing(session, parse_create(&rest, interactive)?).await?,
        "rent" => rental::rent_listing(session, parse_id(&rest)?, !interactive).await?,
        "stop" => rental::stop_listing(session, parse_id(&rest)?).await?,
        "history" => rental::print_activity(session),
        "status" => status::print_status(session),
        "reset" => {
            if leave_demo_mode(session) {
                ui::success("Demo mode cleared; next calls go to the backends");
            } else {
                ui::warning("No backend available; still running in demo mode");
            }
        }
        "clear" => ui::clear(),
        "help" | "?" => print_help(),
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => ui::warning(&format!("Unknown command `{}`; type `help`", other)),
    }
    Ok(Flow::Continue)
}

/// Clear both demo flags. Returns false when a client has no backend to go back to.
fn leave_demo_mode(session: &Session) -> bool {
    session.market.registry().reset_demo_mode();
    session.market.streams().set_demo_mode(false);
    !session.market.demo_status().any()
}

fn parse_id(args: &[&str]) -> Result<u64> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Missing listing id"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("Listing id must be a number, got {:?}", raw))
}

fn parse_create(args: &[&str], interactive: bool) -> Result<CreateArgs> {
    let mut create = CreateArgs {
        token: "fDAIx".to_string(),
        ..Default::default()
    };
    if let Some(rate) = args.first() {
        create.rate = Some(
            rate.parse()
                .map_err(|_| anyhow::anyhow!("Rate must be a number, got {:?}", rate))?,
        );
    }
    create.specs_cid = args.get(1).map(|s| s.to_string());
    if args.len() > 2 {
        create.title = Some(args[2..].join(" "));
    }
    if !interactive && (create.rate.is_none() || create.specs_cid.is_none() || create.title.is_none()) {
        anyhow::bail!("Usage: create <rate-per-hour> <specs-cid> <title..>");
    }
    Ok(create)
}

fn print_help() {
    ui::header("Commands");
    for (usage, description) in HELP {
        println!("  {:<28} {}", usage, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{build_marketplace, MarketConfig};
    use gpuflow_lib::executors::ChainConfig;

    #[test]
    fn parse_id_requires_number() {
        assert_eq!(parse_id(&["3"]).unwrap(), 3);
        assert!(parse_id(&[]).is_err());
        assert!(parse_id(&["x"]).is_err());
    }

    #[test]
    fn parse_create_joins_title() {
        let args = parse_create(&["0.5", "QmCid", "Big", "GPU", "Box"], false).unwrap();
        assert_eq!(args.rate, Some(0.5));
        assert_eq!(args.specs_cid.as_deref(), Some("QmCid"));
        assert_eq!(args.title.as_deref(), Some("Big GPU Box"));
        assert!(parse_create(&["0.5"], false).is_err());
        assert!(parse_create(&["0.5"], true).is_ok());
    }

    fn chain_config() -> MarketConfig {
        MarketConfig {
            chain: Some(ChainConfig::polygon_amoy(
                "http://localhost:8545",
                "0x00000000000000000000000000000000000000c0",
            )),
            ..Default::default()
        }
    }

    #[test]
    fn reset_stays_in_demo_without_backends() {
        let config = chain_config();
        let session = Session {
            market: build_marketplace(&config, true).unwrap(),
            config,
        };
        assert!(!leave_demo_mode(&session));
        assert!(session.market.demo_status().registry);
        assert!(session.market.demo_status().streams);
    }

    #[test]
    fn reset_returns_to_configured_backends() {
        let config = chain_config();
        let session = Session {
            market: build_marketplace(&config, false).unwrap(),
            config,
        };
        session.market.registry().force_demo_mode();
        session.market.streams().set_demo_mode(true);
        assert!(leave_demo_mode(&session));
        assert!(!session.market.demo_status().any());
    }

    #[tokio::test]
    async fn scripted_session_keeps_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let session = Session::open(dir.path(), true).unwrap();

        for line in ["create 2 QmNew New Rig", "rent 2", "stop 2"] {
            assert!(matches!(
                execute(&session, line, false).await.unwrap(),
                Flow::Continue
            ));
        }
        assert_eq!(session.market.registry().demo_ledger().len(), 3);
        assert_eq!(session.market.activity().len(), 2);
        assert!(matches!(
            execute(&session, "quit", false).await.unwrap(),
            Flow::Quit
        ));
    }
}
