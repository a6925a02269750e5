pub mod image;
pub mod settings;
pub mod user;

pub use image::ImageRecord;
pub use settings::AppSettings;
pub use user::{User, UserCredentials};
