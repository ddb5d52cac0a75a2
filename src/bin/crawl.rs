use clap::Parser;
use parbatch::crawler::{Crawler, DEFAULT_CONCURRENCY, InMemoryFetcher};
use parbatch::logging::{LogProfile, init_tracing};

#[derive(Parser)]
#[command(
    name = "crawl",
    about = "Crawl the built-in Go documentation graph with bounded concurrency"
)]
struct Cli {
    /// URL to start from
    #[arg(long, default_value = "https://golang.org/")]
    root: String,
    /// Number of link levels to follow (0 fetches nothing)
    #[arg(long, default_value_t = 4)]
    depth: usize,
    /// Maximum fetches in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,
}

#[tokio::main]
async fn main() {
    init_tracing(LogProfile::Cli);
    let cli = Cli::parse();

    let crawler = Crawler::new(InMemoryFetcher::golang_sample(), cli.concurrency);
    let report = crawler.crawl(&cli.root, cli.depth).await;

    for page in &report.found {
        println!("found: {} {:?}", page.url, page.body);
    }
    for page in &report.missing {
        println!("{}", page.error);
    }
}
