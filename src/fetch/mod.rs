//! Network layer: redirect-chain walking, body capture, and fetch
//! strategies.

pub mod context;
pub mod fetcher;
pub mod snapshot;
pub mod walker;

pub use context::FetchContext;
pub use fetcher::{HttpFetcher, MockFetcher, PageFetcher};
pub use snapshot::PageSnapshot;
pub use walker::{classify_chain, norm_url, walk, RedirectHop, RepeatVisit, WalkOutcome};
