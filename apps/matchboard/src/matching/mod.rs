// Matching: similarity backends, score composition, batch ranking and the
// summaries and exports built from a ranked batch.

pub mod export;
pub mod handlers;
pub mod ranking;
pub mod scoring;
pub mod similarity;
pub mod summary;
