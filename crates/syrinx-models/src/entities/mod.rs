pub mod list;
pub mod notice;
pub mod profile;
pub mod user;

pub use list::UserList;
pub use notice::{Notice, PrivateNotice};
pub use profile::{AdminUser, TwitterUser, UserConfig};
pub use user::{LocalUser, LocalUserBuilder, RemoteUser, User};
