//! Terminal front end

pub mod page;
pub mod setup;
pub mod ui;
pub mod watch;
