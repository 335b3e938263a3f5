//! Browser-independent core of TravelWall: the country dataset and its
//! projection, the wall of per-country photos, and the pure view
//! compositions the page renders from them.

pub mod atlas;
pub mod config;
pub mod constants;
pub mod error;
pub mod map_view;
pub mod photos;
pub mod projection;
pub mod session;
pub mod topology;
pub mod upload_panel;
pub mod wall;

pub use atlas::{Atlas, Country, ProjectedShape};
pub use config::AppConfig;
pub use error::AtlasError;
pub use photos::{
    MemoryFile, MemoryStore, PhotoRecord, PickedFile, PhotoRegistry, PhotoSource, ResourceHandle,
    ResourceStore,
};
pub use session::{HeaderView, SessionAction, SessionProvider, SessionState, SessionStore};
pub use wall::{VisitedCount, WallController, WallSnapshot};
