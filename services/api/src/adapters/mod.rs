pub mod db;
pub mod media;

pub use db::PgStore;
pub use media::{LocalMediaStore, MediaStore};
