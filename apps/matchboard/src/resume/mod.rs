// Resume ingestion: uploaded file bytes → plain text for analysis and scoring.

pub mod extract;

pub use extract::{candidate_name, extract_text_blocking, ExtractError};
