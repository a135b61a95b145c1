pub mod error;
pub mod types;

pub use error::{CacheError, Result};
pub use types::{IdentityRecord, RawEntry, fold_name, parse_token};
