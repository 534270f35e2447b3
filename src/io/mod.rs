//! External-interface adapters: raster access, the baseline archive, and
//! model persistence.

pub mod archive;
pub mod model_store;
pub mod raster;

pub use archive::{BaselineArchive, BaselineProvider};
pub use model_store::ScorerStore;
pub use raster::{read_grid, write_grid};
