//! Command-line surface

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::assistant::Assistant;
use crate::config::AppConfig;
use crate::logging;
use crate::server;
use crate::tools::catalog::{
    self, GET_DAYLIGHT_TIMES, GET_DRIVING_DISTANCE, GET_FORECAST, GET_WEATHER, PLAN_ROAD_TRIP,
    SEARCH_ROUTES,
};
use crate::tools::{ToolServer, ToolTransport, arguments};

const ORIENTATION: &str = "Highland Planner plans outdoor days out in Scotland.

Try:
  highland-planner chat                      talk it through
  highland-planner ask \"Weather in Oban?\"    one question, one answer
  highland-planner weather --location Skye   raw data from a single tool
  highland-planner serve                     run the tool server

Run with --help for every command.";

/// Conversational outdoor adventure planning for Scotland.
#[derive(Parser, Debug)]
#[command(name = "highland-planner", version, about = "Plan outdoor adventures in Scotland")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start an interactive planning conversation.
    Chat,
    /// Ask a single question.
    Ask {
        /// Question text.
        message: String,
    },
    /// Serve the tool protocol over HTTP.
    Serve {
        /// Port override.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Current weather, or a daily forecast when --days is given.
    Weather {
        /// Place name.
        #[arg(long)]
        location: String,
        /// Forecast length (1-7).
        #[arg(long)]
        days: Option<u8>,
    },
    /// Sunrise, sunset and photography light.
    Daylight {
        /// Place name.
        #[arg(long)]
        location: String,
        /// Date as YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<String>,
    },
    /// Driving distance between two places.
    Drive {
        /// Starting place.
        #[arg(long)]
        from: String,
        /// Destination.
        #[arg(long)]
        to: String,
        /// Intermediate stops, in order.
        #[arg(long)]
        via: Vec<String>,
    },
    /// Multi-stop road trip.
    Trip {
        /// Stops, in order.
        #[arg(required = true)]
        locations: Vec<String>,
        /// Where the trip begins.
        #[arg(long)]
        start: Option<String>,
    },
    /// Search the hill-walk catalogue.
    Routes {
        /// Name, area or peak to look for.
        #[arg(long)]
        search: Option<String>,
        /// Region filter.
        #[arg(long)]
        region: Option<String>,
        /// Difficulty from 1 (easy) to 5 (very hard).
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        difficulty: Option<u8>,
        /// Maximum number of routes.
        #[arg(long)]
        max: Option<usize>,
    },
    /// List the available tools.
    Tools,
}

impl Cli {
    /// Load configuration, install logging and run the chosen command.
    pub async fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            println!("{ORIENTATION}");
            return Ok(());
        };

        let config = AppConfig::load_from_path(self.config)?;
        let _guard = logging::init(&config.logging, self.verbose)?;

        match command {
            Command::Chat => chat(&config).await,
            Command::Ask { message } => {
                let assistant = Assistant::from_config(&config)?;
                let mut session = assistant.new_session();
                println!("{}", assistant.respond(&mut session, &message).await);
                Ok(())
            }
            Command::Serve { port } => {
                let mut server_config = config.server.clone();
                if let Some(port) = port {
                    server_config.port = port;
                }
                let tools = ToolServer::from_config(&config)?;
                server::run(&server_config, tools).await
            }
            Command::Tools => {
                for tool in catalog::definitions(config.assistant.features) {
                    println!("{:<22} {}", tool.name, tool.description);
                }
                Ok(())
            }
            data => {
                let (name, args) = tool_call(data)?;
                let tools = ToolServer::from_config(&config)?;
                let text = tools
                    .call_tool(name, args)
                    .await
                    .with_context(|| format!("{name} failed"))?;
                println!("{text}");
                Ok(())
            }
        }
    }
}

/// Translate a data subcommand into a tool name and arguments
pub fn tool_call(command: Command) -> Result<(&'static str, serde_json::Map<String, Value>)> {
    let call = match command {
        Command::Weather {
            location,
            days: Some(days),
        } => (
            GET_FORECAST,
            arguments([("location", json!(location)), ("days", json!(days))]),
        ),
        Command::Weather { location, .. } => {
            (GET_WEATHER, arguments([("location", json!(location))]))
        }
        Command::Daylight { location, date } => {
            let mut args = arguments([("location", json!(location))]);
            if let Some(date) = date {
                args.insert("date".to_string(), json!(date));
            }
            (GET_DAYLIGHT_TIMES, args)
        }
        Command::Drive { from, to, via } => (
            GET_DRIVING_DISTANCE,
            arguments([
                ("from_location", json!(from)),
                ("to_location", json!(to)),
                ("waypoints", json!(via)),
            ]),
        ),
        Command::Trip { locations, start } => {
            let mut args = arguments([("locations", json!(locations))]);
            if let Some(start) = start {
                args.insert("start_location".to_string(), json!(start));
            }
            (PLAN_ROAD_TRIP, args)
        }
        Command::Routes {
            search,
            region,
            difficulty,
            max,
        } => {
            let mut args = serde_json::Map::new();
            for (key, value) in [
                ("search_term", search.map(Value::from)),
                ("region", region.map(Value::from)),
                ("difficulty", difficulty.map(Value::from)),
                ("max_results", max.map(Value::from)),
            ] {
                if let Some(value) = value {
                    args.insert(key.to_string(), value);
                }
            }
            (SEARCH_ROUTES, args)
        }
        other => anyhow::bail!("{other:?} is not a tool command"),
    };
    Ok(call)
}

async fn chat(config: &AppConfig) -> Result<()> {
    let assistant = Assistant::from_config(config)?;
    let mut session = assistant.new_session();
    info!("Chat session started");

    println!("🏔️  Highland Planner. Ask about weather, daylight, drives or walks (type 'quit' to exit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "bye") {
            break;
        }

        let reply = assistant.respond(&mut session, line).await;
        println!("\n{reply}\n");
    }

    println!("Enjoy the hills!");
    Ok(())
}
