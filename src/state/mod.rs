//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the visited and pending URL sets of a single crawl run

mod crawl_state;

pub use crawl_state::CrawlState;
