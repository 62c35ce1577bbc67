//! Stored release records

pub mod codec;
pub mod record;

pub use codec::{decode_release, encode_data, encode_release, DecodeError, ReleaseField};
pub use record::{Chart, ChartFile, ChartMetadata, Hook, HookExecution, PackageRecord, ReleaseInfo};
