use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reelboard::services::poster::PosterClient;
use reelboard::services::transport::ReqwestTransport;
use reelboard::{Config, MovieStore, RecommendationSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let store = Arc::new(MovieStore::load(
        &config.movies_path,
        &config.similarity_path,
    )?);

    let transport = ReqwestTransport::new()?;
    let posters = PosterClient::new(
        transport,
        config.tmdb_api_key,
        config.tmdb_api_url,
        config.image_base_url,
    );
    let mut session = RecommendationSession::new(store, posters);

    println!("Movie recommender. Enter a title, `more` for the next batch, `quit` to exit.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "more" => {
                if !session.request_more() {
                    if session.selected_title().is_none() {
                        println!("Select a movie first.");
                    } else {
                        println!(
                            "All {} recommendations already shown.",
                            session.total_candidates()
                        );
                    }
                    continue;
                }
                print_batch(session.next_batch().await?);
                report_progress(&session);
            }
            title => {
                if let Err(e) = session.select_movie(title) {
                    // Bad titles are recoverable; keep the loop alive.
                    println!("{}", e);
                    continue;
                }
                print_batch(session.next_batch().await?);
                report_progress(&session);
            }
        }
    }

    Ok(())
}

fn print_batch(batch: &[reelboard::Recommendation]) {
    for rec in batch {
        match &rec.poster_url {
            Some(url) => println!("  {}  {}", rec.title, url),
            None => println!("  {}  [no poster]", rec.title),
        }
    }
}

fn report_progress<T: reelboard::services::transport::HttpTransport>(
    session: &RecommendationSession<T>,
) {
    if session.is_complete() {
        println!(
            "All {} recommendations displayed.",
            session.total_candidates()
        );
    } else {
        println!("Type `more` for the next batch.");
    }
}
