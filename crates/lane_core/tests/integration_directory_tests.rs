use std::io::Write;
use std::sync::Arc;
use std::thread;

use lane_core::directory::{CacheStats, SnapshotError};
use lane_core::test_helpers::{atlanta_area_cities, chicago_area_cities, CHICAGO};
use lane_core::{
    CachedCityDirectory, CityDirectory, CityRef, CrawlConfig, CrawlRequest, InMemoryCityDirectory,
    LaneCrawler, UsedCities,
};

fn snapshot_file() -> tempfile::NamedTempFile {
    let mut cities = chicago_area_cities();
    cities.extend(atlanta_area_cities());
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    serde_json::to_writer(&mut file, &cities).expect("write snapshot");
    file.flush().expect("flush snapshot");
    file
}

#[test]
fn snapshot_round_trips_through_a_file() {
    let file = snapshot_file();

    let directory = InMemoryCityDirectory::from_json_path(file.path()).expect("load snapshot");

    assert_eq!(
        directory.len(),
        chicago_area_cities().len() + atlanta_area_cities().len()
    );
    let milwaukee = directory
        .find_by_name_state("milwaukee", "wi")
        .expect("lookup")
        .expect("milwaukee present");
    assert_eq!(milwaukee.market_key(), "MKE");
    assert!(milwaukee.is_market_anchor());
}

#[test]
fn missing_snapshot_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");
    let err = InMemoryCityDirectory::from_json_path(path).unwrap_err();
    assert!(matches!(err, SnapshotError::Io(_)));
}

#[test]
fn radius_results_skip_records_without_coordinates() {
    let directory = InMemoryCityDirectory::new(chicago_area_cities());

    let names: Vec<_> = directory
        .find_within_radius(CHICAGO.0, CHICAGO.1, 125.0)
        .expect("radius query")
        .into_iter()
        .map(|city| city.name)
        .collect();

    assert!(!names.iter().any(|name| name == "Ghost Town"));
    assert_eq!(names.len(), chicago_area_cities().len() - 1);
}

#[test]
fn snapshot_directory_drives_a_crawl() {
    let file = snapshot_file();
    let directory = InMemoryCityDirectory::from_json_path(file.path()).expect("load snapshot");
    let crawler = LaneCrawler::new(directory, CrawlConfig::default()).expect("config");
    let request = CrawlRequest::new(
        CityRef::new("Chicago", "IL"),
        CityRef::new("Atlanta", "GA"),
        "V",
    );

    let result = crawler
        .generate_diverse_pairs(&request, &mut UsedCities::new())
        .expect("crawl");

    assert_eq!(result.pairs.len(), 5);
}

#[test]
fn shared_cached_directory_serves_concurrent_crawls() {
    let mut cities = chicago_area_cities();
    cities.extend(atlanta_area_cities());
    let directory = InMemoryCityDirectory::new(cities);
    let cached = Arc::new(CachedCityDirectory::with_default_capacity(directory));
    let crawler = LaneCrawler::new(Arc::clone(&cached), CrawlConfig::default()).expect("config");
    let request = CrawlRequest::new(
        CityRef::new("Chicago", "IL"),
        CityRef::new("Atlanta", "GA"),
        "FD",
    );

    let crawl = || crawler.generate_diverse_pairs(&request, &mut UsedCities::new());

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(crawl)).collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("crawl thread").expect("crawl"))
            .collect()
    });

    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    let CacheStats { hits, misses } = cached.stats();
    assert_eq!(hits + misses, 16);
    assert!(misses >= 4);
}
