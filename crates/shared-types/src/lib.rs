pub mod config;
pub mod error;
pub mod models;
pub mod requests;
pub mod responses;
pub mod roles;

pub use config::*;
pub use error::*;
pub use models::*;
pub use requests::*;
pub use responses::*;
pub use roles::*;
