use anyhow::Context;
use chrono::Local;
use inquire::{InquireError, Text};
use weather_dashboard_core::{Dashboard, render, view::SEARCH_PLACEHOLDER};

const HELP: &str = "/fav toggles favorite, /N opens favorite N, /quit exits";

/// One line typed at the search prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Empty,
    Search(String),
    ToggleFavorite,
    /// 1-based chip number as shown on screen.
    SelectFavorite(usize),
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return if line.is_empty() {
                Self::Empty
            } else {
                Self::Search(line.to_string())
            };
        };

        match command {
            "fav" | "favorite" => Self::ToggleFavorite,
            "quit" | "q" | "exit" => Self::Quit,
            n => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::SelectFavorite(n),
                _ => Self::Unknown(line.to_string()),
            },
        }
    }
}

pub async fn run(mut dashboard: Dashboard) -> anyhow::Result<()> {
    loop {
        print!("{}", render(&dashboard, &Local));
        println!();

        let initial = dashboard.query().to_string();
        let line = match Text::new("City:")
            .with_placeholder(SEARCH_PLACEHOLDER)
            .with_initial_value(&initial)
            .with_help_message(HELP)
            .prompt()
        {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read search input"),
        };

        match Input::parse(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Search(city) => {
                dashboard.set_query(city);
                dashboard.begin_fetch();
                print!("{}", render(&dashboard, &Local));
                dashboard.submit().await;
            }
            Input::ToggleFavorite => {
                if dashboard.toggle_current_favorite().is_none() {
                    println!("Search for a city first.");
                }
            }
            Input::SelectFavorite(n) => {
                if n > dashboard.favorites().len() {
                    println!("No favorite #{n}.");
                    continue;
                }
                dashboard.begin_fetch();
                print!("{}", render(&dashboard, &Local));
                dashboard.select_favorite(n - 1).await;
            }
            Input::Unknown(cmd) => println!("Unknown command: {cmd}. {HELP}."),
        }
    }

    Ok(())
}
