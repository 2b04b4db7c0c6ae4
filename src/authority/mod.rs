//! Source authority from a ranked-domain list.

pub mod cmd;
pub mod dataset;
pub mod provider;
pub mod resolver;

pub use dataset::RankTable;
pub use provider::{AuthorityError, DatasetKey, RankProvider, TrancoConfig, TrancoProvider};
pub use resolver::AuthorityResolver;
