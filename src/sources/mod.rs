pub mod traits;
pub mod types;
pub mod wfs;

pub use traits::FeatureSource;
pub use types::{WfsQuery, DEFAULT_WFS_URL};
pub use wfs::WfsClient;
