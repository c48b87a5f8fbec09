pub mod carbon;
pub mod fetch;
pub mod providers;
pub mod setup;
pub mod ui;
