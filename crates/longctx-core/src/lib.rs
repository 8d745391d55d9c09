pub mod comparison;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod tokenize;

#[cfg(feature = "network")]
pub mod providers;
#[cfg(feature = "network")]
pub mod query;

pub use comparison::{Answer, ComparisonSet, QueryError, QueryResult, TokenSource};
pub use corpus::{Corpus, Document};
pub use error::LcError;
pub use metrics::CostEfficiency;
pub use registry::{ModelSpec, Provider, Registry};
