//! HTTP adapters.

pub mod bundle_fetcher;

pub use bundle_fetcher::HttpBundleFetcher;
