pub mod db;
pub mod files;
pub mod password;
pub mod toast;

pub use db::DbAdapter;
pub use files::InMemoryFileTransfer;
pub use password::Argon2Hasher;
pub use toast::ToastAdapter;
