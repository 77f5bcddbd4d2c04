pub mod setup;
pub mod total;
pub mod ui;
