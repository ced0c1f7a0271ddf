use log::error;
use std::env;

use recipe_link::{extract_recipe, relay, AppConfig, HttpRelayClient, ParseOutcome};

const USAGE: &str = "Usage: recipe-link [serve | extract <video-url>]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = AppConfig::load()?;

    match args.get(1).map(String::as_str) {
        None | Some("serve") => relay::serve(&config.relay).await?,
        Some("extract") => {
            let url = args.get(2).ok_or(USAGE)?;
            let client = HttpRelayClient::new(&config.client);
            match extract_recipe(&client, url).await? {
                ParseOutcome::Parsed(fields) => {
                    println!("{}", serde_json::to_string_pretty(&fields)?)
                }
                ParseOutcome::Unparsable(e) => {
                    error!("No recipe in the workflow reply: {}", e);
                    return Err(e.into());
                }
            }
        }
        Some(_) => return Err(USAGE.into()),
    }

    Ok(())
}
