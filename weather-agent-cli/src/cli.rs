use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_agent_core::{Agent, Config, WeatherLookup};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-agent", version, about = "get_weather agent tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and geocoding language in the config file.
    Configure,

    /// Show current weather for a place.
    Show {
        /// City, region or country name.
        place: String,

        /// Print the raw `{status, report}` object instead of the sentence.
        #[arg(long)]
        json: bool,
    },

    /// Invoke a tool exactly as the agent runtime would.
    Call {
        /// JSON arguments, e.g. '{"city": "東京"}'.
        arguments: String,

        /// Tool name.
        #[arg(long, default_value = "get_weather")]
        tool: String,
    },

    /// Print the agent definition (instruction and tool schemas) as JSON.
    Agent,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { place, json } => {
                let config = Config::from_env()?;
                let report = WeatherLookup::from_config(&config)?.get_weather(&place).await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!("{}", report.report);
                }

                if !report.is_success() {
                    bail!("weather lookup for '{place}' failed");
                }
                Ok(())
            }
            Command::Call { arguments, tool } => {
                let agent = Agent::weather(&Config::from_env()?)?;
                let value = agent.call(&tool, &arguments).await?;
                println!("{}", serde_json::to_string_pretty(&value)?);
                Ok(())
            }
            Command::Agent => {
                let agent = Agent::weather(&Config::from_env()?)?;
                println!("{}", serde_json::to_string_pretty(&agent.definition())?);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("API key (geocoding + weather):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let language = Text::new("Geocoding response language:")
        .with_default(&config.language)
        .prompt()
        .context("Failed to read language")?;
    config.language = language;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    if !config.has_api_key() {
        println!("No API key stored; set WEATHER_API_KEY or run `weather-agent configure` again.");
    }
    Ok(())
}
