//! Geographic diversity city-pairing engine for freight lane postings.
//!
//! Given an origin and a destination city, the engine finds nearby alternate cities
//! around each endpoint that stay within a search radius but spread across distinct
//! freight market areas, then pairs origin alternates with destination alternates so
//! one lane can be posted as several realistic variations.

pub mod assignment;
pub mod config;
pub mod crawl;
pub mod directory;
pub mod diversity;
pub mod error;
pub mod geo;
pub mod normalize;
pub mod scoring;
pub mod types;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use assignment::{assign_max_weight, PairingAlgorithm, PairingStrategy};
pub use config::CrawlConfig;
pub use crawl::{CrawlMetadata, CrawlRequest, CrawlResult, EndpointSearch, LaneCrawler};
pub use directory::{CachedCityDirectory, CityDirectory, InMemoryCityDirectory};
pub use diversity::{select_diverse, DiverseSelection, SelectionOptions};
pub use error::{ConfigError, DirectoryError, LaneError};
pub use geo::{bounding_box_from_radius, haversine_miles, BoundingBox};
pub use normalize::{city_key, normalize_city_name};
pub use scoring::{DistanceDiversityScorer, PairScorer};
pub use types::{CandidateCity, CityRecord, CityRef, PairCandidate, ReferencePoint, UsedCities};
