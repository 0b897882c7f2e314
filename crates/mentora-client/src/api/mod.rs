//! API endpoint implementations.

mod assessments;
mod auth;
mod groups;
mod sessions;
mod users;

pub use assessments::AssessmentsApi;
pub use auth::AuthApi;
pub use groups::GroupsApi;
pub use sessions::SessionsApi;
pub use users::UsersApi;
