mod debounce;
mod photos;

pub use debounce::Debounce;
pub use photos::PhotosController;
