use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cityweather_core::{BusyState, Config, View, Widget, provider_from_config, render};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use tokio::{sync::watch, task::JoinHandle};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather for a city")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Rio de Janeiro".
        city: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Search repeatedly; press Esc to quit.
    Interactive {
        #[command(flatten)]
        lookup: LookupArgs,
    },
}

#[derive(Debug, clap::Args)]
pub struct LookupArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Use this API key instead of the configured one.
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Plain text for terminals.
    Text,
    /// The HTML fragment for the result container.
    Html,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city, lookup } => {
                let mut widget = build_widget(lookup.api_key)?;
                let indicator = spawn_busy_indicator(widget.subscribe());

                let code = print_view(widget.submit(&city).await, lookup.format);

                indicator.abort();
                Ok(code)
            }
            Command::Interactive { lookup } => {
                let mut widget = build_widget(lookup.api_key)?;
                let indicator = spawn_busy_indicator(widget.subscribe());

                while let Some(input) = prompt_city().await? {
                    print_view(widget.submit(&input).await, lookup.format);
                }

                indicator.abort();
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty.");
    }

    cfg.set_api_key(api_key);
    let path = cfg.save()?;

    println!("Saved API key to {}", path.display());
    Ok(())
}

fn build_widget(api_key: Option<String>) -> anyhow::Result<Widget> {
    let mut cfg = Config::load()?;
    if let Some(api_key) = api_key {
        cfg.set_api_key(api_key);
    }

    let provider = provider_from_config(&cfg)?;
    Ok(Widget::new(provider))
}

/// Prints `Searching...` to stderr each time the widget goes busy.
fn spawn_busy_indicator(mut rx: watch::Receiver<BusyState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().loader_visible() {
                eprintln!("Searching...");
            }
        }
    })
}

/// Returns `None` when the user leaves with Esc or Ctrl-C.
async fn prompt_city() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| {
        Text::new("City:")
            .with_help_message("Esc to quit")
            .prompt()
    })
    .await?;

    match answer {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read city name"),
    }
}

fn print_view(view: &View, format: Format) -> ExitCode {
    match view {
        View::Weather { observation, html } => {
            match format {
                Format::Html => println!("{html}"),
                Format::Text => println!("{}", render::render_text(observation)),
            }
            ExitCode::SUCCESS
        }
        View::Error(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        View::Empty => ExitCode::SUCCESS,
    }
}
