//! Photo Feed Common Library
//!
//! ネットワークに依存しない型とロジック（フィルタ、クエリ生成、正規化）

pub mod catalog;
pub mod error;
pub mod filters;
pub mod fingerprint;
pub mod normalizer;
pub mod query;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use filters::{FilterCriteria, FilterOption, GeoPoint};
pub use fingerprint::Fingerprint;
pub use normalizer::{normalize, normalize_photo};
pub use query::{ParameterSet, QueryBuilder};
pub use types::{PhotoRecord, RawPhoto, SearchPayload};
