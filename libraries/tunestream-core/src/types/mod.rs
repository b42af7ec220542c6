//! Domain types shared by the catalog and the player

mod ids;
mod track;

pub use ids::TrackId;
pub use track::Track;
