//! Crawl one lane and print the alternate pairs with their search metadata.
//!
//! Run with: cargo run -p lane_core --example lane_crawl [-- cities.json [config.json]]
//!
//! Without arguments the built-in Chicago/Atlanta fixture is used. Set
//! `RUST_LOG=lane_core=debug` to see each radius attempt.

use lane_core::test_helpers::chicago_atlanta_directory;
use lane_core::{
    CachedCityDirectory, CityRef, CrawlConfig, CrawlRequest, InMemoryCityDirectory, LaneCrawler,
    UsedCities,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lane_core=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let directory = match args.next() {
        Some(path) => InMemoryCityDirectory::from_json_path(path)?,
        None => chicago_atlanta_directory(),
    };
    let config = match args.next() {
        Some(path) => CrawlConfig::from_json_path(path)?,
        None => CrawlConfig::default(),
    };

    let crawler = LaneCrawler::new(
        CachedCityDirectory::with_default_capacity(directory),
        config,
    )?;
    let mut used = UsedCities::new();

    for prefer_fill_to_10 in [false, true] {
        let request = CrawlRequest::new(
            CityRef::new("Chicago", "IL"),
            CityRef::new("Atlanta", "GA"),
            "FD",
        )
        .with_prefer_fill_to_10(prefer_fill_to_10);
        let result = crawler.generate_diverse_pairs(&request, &mut used)?;
        let meta = &result.metadata;

        println!(
            "--- {}, {} -> {}, {} ({}, fill to 10: {}) ---",
            result.base_origin.name,
            result.base_origin.state,
            result.base_destination.name,
            result.base_destination.state,
            result.equipment,
            prefer_fill_to_10,
        );
        for (i, pair) in result.pairs.iter().enumerate() {
            println!(
                "  {:>2}  {:<14} {} [{:<4}] {:>5.1} mi  ->  {:<14} {} [{:<4}] {:>5.1} mi  {:.4}",
                i + 1,
                pair.origin.city.name,
                pair.origin.city.state,
                pair.origin.market_key(),
                pair.origin.distance_miles,
                pair.destination.city.name,
                pair.destination.city.state,
                pair.destination.market_key(),
                pair.destination.distance_miles,
                pair.score,
            );
        }
        println!(
            "  pairs {}/{}  origin markets {}  destination markets {}  radius used {:?}/{:?} mi",
            meta.pair_count,
            meta.target_pairs,
            meta.unique_origin_markets,
            meta.unique_dest_markets,
            meta.origin_search.radius_used_miles,
            meta.destination_search.radius_used_miles,
        );
        if meta.is_short() {
            println!("  (short: not enough distinct alternates left in range)");
        }
    }

    println!("Cities used across both crawls: {}", used.len());
    Ok(())
}
