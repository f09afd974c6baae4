//! Command implementations.

pub mod analyze;
pub mod init;
pub mod show;

pub use self::analyze::execute_analyze;
pub use self::init::execute_init;
pub use self::show::execute_show;
