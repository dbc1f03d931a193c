// Resume ↔ job description matching.
// Pipeline: section split → per-section embedding similarity → weighted aggregate.
// The splitter and scorer are traits carried in AppState so either can be swapped.

pub mod aggregate;
pub mod handlers;
pub mod sections;
pub mod similarity;

#[cfg(test)]
pub(crate) mod test_support;
