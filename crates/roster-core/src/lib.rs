pub mod answers;
pub mod assessment;
pub mod certification;
pub mod config;
pub mod error;
pub mod import;
pub mod init;
pub mod io;
pub mod matcher;
pub mod member;
pub mod messaging;
pub mod paths;
pub mod response;
pub mod roadmap;
pub mod scoring;
pub mod skill;
pub mod succession;
pub mod trainer;
pub mod vertical;
pub mod wizard;

pub use error::{Result, RosterError};
pub use response::ActionResult;
