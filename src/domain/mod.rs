pub mod error;
pub mod machine;
pub mod model;

pub use error::AppError;
pub use machine::{Command, ConfirmationToken, Event, RequestToken, SelectionMachine};
pub use model::{DownloadRequest, MediaType, QualityTier, ResolvedMedia, TierInfo};
