//! Favicon resolution: candidate generation, probing, scoring and caching

mod candidates;
mod probe;
mod resolver;
mod scorer;

pub use candidates::{
    favicon_candidates, is_low_res_domain_query, with_cache_bust, IconProvider, GENERIC_ASSET_PATH,
};
pub use probe::{decode_dimensions, HttpImageProbe, ImageProbe, ProbeResult};
pub use resolver::{FaviconResolver, FaviconSource, LoadOutcome, RefreshProgress, RefreshSummary};
pub use scorer::{is_same_site, score, score_with, ScoreWeights, DISQUALIFIED};
