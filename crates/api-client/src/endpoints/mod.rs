//! Endpoint-specific API implementations
//!
//! Each module binds a domain operation to a fixed verb and path.
//!
//! | Module | Operation | Route |
//! |--------|-----------|-------|
//! | `user` | `login` | `POST /auth/login` |
//! | `user` | `wechat_login` | `POST /user/wechat-login` |
//! | `user` | `get_user_info` | `GET /user/info` |
//! | `common` | `get_brands` | `GET /home/brand` |

pub mod common;
pub mod user;

pub use common::CommonApi;
pub use user::UserApi;

/// Routes that are called before a session exists
pub const PUBLIC_PATHS: &[&str] = &[common::BRANDS_PATH, user::LOGIN_PATH, user::WECHAT_LOGIN_PATH];
