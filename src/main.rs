use std::io;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::TryStreamExt;
use ratatui::prelude::*;

mod app;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod services;
mod tui;

use app::App;
use cli::Command;
use config::Config;
use db::{Repository, SCHEMA_VERSION};
use error::Result;
use models::FeedRecord;
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Bad arguments are reported before the store is touched
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let config = Config::load()?;

    // A store that cannot be opened ends the session
    let repository = match Repository::open(&config.db_path, SCHEMA_VERSION).await {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    match command {
        Command::List => return list_feeds(&repository).await,
        Command::Add(feed) => {
            let record = repository.insert_feed(feed).await?;
            println!("{}", serde_json::to_string(&record)?);
            return Ok(());
        }
        Command::Delete(id) => {
            if repository.delete_feed(id).await? {
                println!("Removed feed {}", id);
            } else {
                println!("No feed with id {}", id);
            }
            return Ok(());
        }
        Command::Tui => {}
    }

    let mut app = App::new(repository).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let result = run_app(&mut terminal, &mut app, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn list_feeds(repository: &Repository) -> Result<()> {
    let mut feeds: Vec<FeedRecord> = repository.scan_all().try_collect().await?;
    feeds.reverse();
    for feed in feeds {
        println!("{}", serde_json::to_string(&feed)?);
    }
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
