pub mod cli;
pub mod logging;
pub mod manager;
pub mod mention;
pub mod normalize;
pub mod providers;
pub mod scrape;

#[cfg(test)]
mod test_support;

pub use cli::{handle_command, SourcesArgs, SourcesCommands};
pub use logging::{init_logging, Logger};
pub use manager::{ReportManager, ReportRequest};
pub use mention::CompanyMatcher;
pub use normalize::{DateWindow, NormalizeOptions, Normalizer};
pub use providers::{create_providers, NewsProvider, RawArticle, SourceInfo, SourcesConfig};
pub use scrape::{HttpPageFetcher, PageFetcher, ScrapedPage};

pub mod prelude {
    pub use super::manager::{ReportManager, ReportRequest};
    pub use super::providers::NewsProvider;
    pub use super::scrape::PageFetcher;
    pub use ns_core::{Article, Error, Report, Result};
}
