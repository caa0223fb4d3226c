// Job corpus: loaded once at startup from CSV and shared read-only.

pub mod corpus;
pub mod handlers;

pub use corpus::{JobCorpus, JobField, JobPosting};
