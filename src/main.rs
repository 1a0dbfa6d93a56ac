// src/main.rs
use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    terminal,
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod markdown;
mod messages;
mod models;
mod overlay;
mod prompts;
mod provider;
mod scanner;
mod theme;
mod ui;
mod utils;

use crate::messages::EventBus;
use crate::models::App;
use crate::provider::{Provider, ProviderClient};
use crate::theme::Theme;

#[derive(Parser)]
#[command(
    name = "codesplain",
    version,
    about = "Explain code and size up GitHub repos with Gemini or OpenAI"
)]
struct Cli {
    /// GitHub repository URL preloaded into the Repository section
    repo: Option<String>,

    /// Override the configured provider for this session (gemini or openai)
    #[arg(long)]
    provider: Option<Provider>,
}

fn main() -> Result<()> {
    // Silent unless RUST_LOG is set, so the terminal stays usable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = config::Settings::load()?;
    if let Some(provider) = cli.provider {
        settings.provider = provider;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let client = ProviderClient::new();
    let http = reqwest::Client::new();
    let (bus, rx) = EventBus::channel();
    let theme = Theme::default();
    let mut app = App::new(settings, cli.repo);

    terminal::enable_raw_mode()?;
    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    loop {
        terminal.draw(|f| ui::render(f, &app, &theme))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key_event) = event::read()? {
                if !input::handle_key(key_event.code, &mut app, &client, &http, &bus, &rt)? {
                    break;
                }
            }
        }

        // Apply whatever the workers routed back since the last turn.
        while let Ok(event) = rx.try_recv() {
            app.apply_event(event);
        }
        app.tick(Instant::now());
    }

    terminal::disable_raw_mode()?;
    Ok(())
}
