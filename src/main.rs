use anyhow::Result;
use colored::*;

mod app;
mod config;
mod credentials;
mod groq;
mod handler;
mod qalog;
mod session;
mod tui;
mod ui;

use app::App;
use groq::GroqClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Resolve the API key before anything touches the network
    let Some(credential) = credentials::resolve() else {
        eprintln!("{}", "No API key provided.".red());
        eprintln!(
            "Set {} or get a free key at {}",
            credentials::API_KEY_VAR.bold(),
            credentials::SIGNUP_URL
        );
        std::process::exit(1);
    };

    let client = match GroqClient::new(&credential.value) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "Could not initialize the API client:".red(), e);
            std::process::exit(1);
        }
    };

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(client, credential.source);

    let run_result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    run_result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event).await?;
        } else {
            break;
        }
    }
    Ok(())
}
