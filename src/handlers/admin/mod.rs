pub mod admins;
pub mod analytics;
pub mod images;
pub mod overview;
pub mod settings;
pub mod users;
pub mod whoami;

pub use admins::{admin_demote, admin_provision, admins_list};
pub use analytics::analytics;
pub use images::{image_delete, images_list};
pub use overview::overview;
pub use settings::{settings_get, settings_put};
pub use users::{user_credits_put, user_role_put, users_list};
pub use whoami::whoami;
