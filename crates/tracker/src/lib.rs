pub mod db;

mod clock;
pub use clock::*;

mod repository;
pub use repository::*;

mod session;
pub use session::*;

pub mod seed;
