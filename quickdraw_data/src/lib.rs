//! Loading and preparation of Quick Draw sketch bitmaps: the fixed
//! category registry, the `.npy` sample store, train/validation
//! assembly, and the augmentation pass.

pub mod augment;
pub mod categories;
pub mod dataset;
pub mod error;
pub mod npy;
pub mod store;

pub use categories::{Category, IMG_PIXELS, IMG_SIZE, NUM_CLASSES, categories};
pub use dataset::LabeledSet;
pub use error::{DataErr, Result};
pub use store::SampleStore;
