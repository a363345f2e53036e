mod app;
mod forms;
mod helpers;
mod tables;
mod terminal;
mod worker;

pub use app::App;
pub use terminal::run_app;
