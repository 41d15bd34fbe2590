use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::ProgressBar;
use tracing::info;

use ug_scraper::selector::Selector;
use ug_scraper::{ContentType, Scraper, ScraperRecord, Settings};

const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const RULE: &str = "=======================================================";

#[derive(Parser)]
#[command(name = "ugscrape", about = "Search tabs and chords, pick with fzf, print as text")]
struct Cli {
    /// Allowed content types: [c]hords, [t]abs, [u]kulele, [b]ass, [d]rums, [v]ideo
    #[arg(short, long, default_value = "ct")]
    types: String,

    /// Disallow selecting multiple items with <Tab>
    #[arg(short = 'm', long)]
    no_multi: bool,

    /// Skip search and selection; treat the arguments as content URLs
    #[arg(long)]
    url: bool,

    /// Print the raw JSON payload(s) instead of formatted content
    #[arg(long)]
    dump: bool,

    /// Search query (or URLs with --url)
    #[arg(required = true)]
    query: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let scraper = Scraper::from_settings(&settings).context("Failed to build HTTP client")?;

    if cli.url {
        if cli.dump {
            return dump_pages(&scraper, &cli.query);
        }
        fetch_and_print(&scraper, &cli.query);
        return Ok(());
    }

    let query = cli.query.join(" ").trim().to_string();
    if query.is_empty() {
        bail!("Empty query");
    }
    if cli.dump {
        let mut pipeline = scraper.search_pipeline();
        pipeline.load(&query)?;
        println!("{}", serde_json::to_string_pretty(pipeline.dump()?)?);
        return Ok(());
    }

    let allowed = allowed_types(&cli.types);
    let results = search_with_spinner(&scraper, &query)?;
    let candidates: Vec<ScraperRecord> = results
        .into_iter()
        .filter(|r| r.content_url.is_some() && r.content_is_plaintext && allowed.contains(&r.kind))
        .collect();
    if candidates.is_empty() {
        bail!("No entry of specified type was found for query '{}'", query);
    }
    info!("{} selectable results", candidates.len());

    let selector = Selector::new(settings.selector_command.as_str(), !cli.no_multi);
    let chosen = selector
        .select(&candidates)
        .context("Interactive selection failed")?;

    let by_uid: HashMap<u32, &ScraperRecord> =
        candidates.iter().map(|r| (r.scrape_uid, r)).collect();
    let urls: Vec<String> = chosen
        .iter()
        .filter_map(|uid| by_uid.get(uid)?.content_url.clone())
        .collect();

    fetch_and_print(&scraper, &urls);
    Ok(())
}

fn search_with_spinner(scraper: &Scraper, query: &str) -> ug_scraper::Result<Vec<ScraperRecord>> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Searching - this may take a while");
    pb.enable_steady_tick(Duration::from_millis(120));
    let results = scraper.search(query);
    pb.finish_and_clear();
    results
}

/// Parse `-t` flags; nonsense falls back to chords + tabs.
fn allowed_types(flags: &str) -> HashSet<ContentType> {
    let types: HashSet<ContentType> = flags.chars().filter_map(ContentType::from_flag).collect();
    if types.is_empty() {
        HashSet::from([ContentType::Chords, ContentType::Tab])
    } else {
        types
    }
}

/// Fetch each URL in turn and print it. A failing URL is reported inline.
fn fetch_and_print(scraper: &Scraper, urls: &[String]) {
    for (i, url) in urls.iter().enumerate() {
        if i != 0 {
            println!();
        }
        match scraper.fetch_content(url) {
            Ok(record) => print_record(&record),
            Err(e) => {
                println!("### ERROR ###");
                println!("{}", e);
                if let Some(cause) = e.cause() {
                    println!("caused by: {}", cause);
                }
                println!("### ERROR ###");
            }
        }
    }
}

fn print_record(r: &ScraperRecord) {
    println!("{}", RULE);
    println!("Song: {}", r.song_name.as_deref().unwrap_or(""));
    println!("Artist: {}", r.artist_name.as_deref().unwrap_or(""));
    println!("URL: {}", r.content_url.as_deref().unwrap_or(""));
    println!("{}", RULE);
    println!();
    println!("{}", render_content(r));
}

fn render_content(r: &ScraperRecord) -> String {
    if !r.content_is_plaintext {
        return "### CONTENT NOT PLAINTEXT ###".to_string();
    }
    match r.content.as_deref().map(str::trim) {
        None | Some("") => "### NO CONTENT ###".to_string(),
        // Trimmed so a trailing newline in the id doesn't end up inside the URL.
        Some(video_id) if r.kind == ContentType::Video => format!("{}{}", YOUTUBE_WATCH_URL, video_id),
        Some(_) => r.content.clone().unwrap_or_default(),
    }
}

fn dump_pages(scraper: &Scraper, urls: &[String]) -> anyhow::Result<()> {
    for url in urls {
        let mut pipeline = scraper.page_pipeline();
        pipeline
            .load(url)
            .with_context(|| format!("Failed to load {}", url))?;
        println!("{}", serde_json::to_string_pretty(pipeline.dump()?)?);
    }
    Ok(())
}
