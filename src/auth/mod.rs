//! Bearer token authentication and the user accounts it is issued for.

mod log_in;
mod log_out;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;
mod verify;

pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use middleware::{Identity, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use token::DEFAULT_TOKEN_DURATION;
pub use user::{
    User, UserID, create_user, create_user_table, ensure_demo_user, get_user_by_email,
    get_user_by_id, update_password,
};
pub use verify::get_verify;
