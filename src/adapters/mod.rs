// Adapters layer: concrete code sources (local filesystem, S3).

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalCodeSource;
#[cfg(feature = "s3")]
pub use s3::S3CodeSource;
