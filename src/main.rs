use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use flickr_viewer::{
    config::Config,
    dotenv,
    error::ViewerError,
    models::Listing,
    session::{CancelPrompt, SearchOutcome},
    viewer::Viewer,
};
use log::error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

type InputLines = Arc<Mutex<Lines<BufReader<Stdin>>>>;

/// Asks on the same stdin the commands come from
struct StdinPrompt {
    lines: InputLines,
}

#[async_trait]
impl CancelPrompt for StdinPrompt {
    async fn confirm_cancel(&self, pending_query: &str) -> bool {
        println!("Cancel the current Flickr search for [{}]? [y/N]", pending_query);
        match self.lines.lock().await.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim(), "y" | "Y" | "yes"),
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Search(String),
    Select(usize),
    Cancel,
    List,
    Json,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    match word {
        "search" | "s" => Command::Search(rest.to_owned()),
        "select" => match rest.trim().parse() {
            Ok(index) => Command::Select(index),
            Err(_) => Command::Unknown(line.to_owned()),
        },
        "cancel" => Command::Cancel,
        "list" | "ls" => Command::List,
        "json" => Command::Json,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_owned()),
    }
}

fn report(err: &ViewerError) {
    error!("{:?}", err);
    match err {
        ViewerError::Transport(_) => println!("{}", err),
        _ => println!("An error occurred: {}", err),
    }
}

fn print_listing(listing: &Listing) {
    match listing {
        Listing::Results(results) => {
            for (index, photo) in results.iter().enumerate() {
                println!("{:>4}  {}", index, photo.title);
            }
        }
        other => {
            for line in other.lines() {
                println!("{}", line);
            }
        }
    }
}

async fn start_search(viewer: &Arc<Viewer>, query: &str) {
    let pending = viewer.session.start_search(query).await;
    print_listing(&viewer.session.display().listing);
    let viewer = Arc::clone(viewer);
    tokio::spawn(async move {
        match pending.finish().await {
            Ok(SearchOutcome::Displayed(_)) => print_listing(&viewer.session.display().listing),
            Ok(SearchOutcome::Superseded) => {}
            Err(ViewerError::UserCancelled) => println!("Search cancelled"),
            Err(err) => report(&err),
        }
    });
}

fn select(viewer: &Arc<Viewer>, index: usize) {
    let viewer = Arc::clone(viewer);
    tokio::spawn(async move {
        match viewer.select(index).await {
            Ok(None) => println!("Nothing to select at {}", index),
            Ok(Some(outcome)) => {
                match &outcome.display {
                    Ok(image) if outcome.shown => {
                        let (width, height) = image.dimensions();
                        println!("Showing {} ({}x{})", outcome.photo.title, width, height);
                    }
                    Ok(_) => {}
                    Err(err) => report(err),
                }
                match &outcome.thumbnail {
                    Ok(path) => println!("Thumbnail saved to {}", path.display()),
                    Err(err) => report(err),
                }
            }
            Err(err) => report(&err),
        }
    });
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let lines: InputLines = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines()));
    let prompt = Arc::new(StdinPrompt {
        lines: Arc::clone(&lines),
    });
    let viewer = Arc::new(Viewer::new(&config, prompt)?);

    let initial = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !initial.is_empty() {
        start_search(&viewer, &initial).await;
    }

    loop {
        let line = match lines.lock().await.next_line().await? {
            Some(line) => line,
            None => break,
        };
        match parse_command(&line) {
            Command::Search(query) => start_search(&viewer, &query).await,
            Command::Select(index) => select(&viewer, index),
            Command::Cancel => {
                if !viewer.session.cancel() {
                    println!("No search is running");
                }
            }
            Command::List => print_listing(&viewer.session.display().listing),
            Command::Json => println!("{}", serde_json::to_string_pretty(&viewer.session.display().listing)?),
            Command::Quit => break,
            Command::Unknown(line) if line.is_empty() => {}
            Command::Unknown(line) => println!(
                "Unknown command [{}], try: search <tags>, select <n>, cancel, list, json, quit",
                line
            ),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    better_panic::install();
    dotenv().ok();
    env_logger::init();

    match run().await {
        Ok(_) => {}
        Err(err) => eprintln!("{:?}", err),
    };
}
