pub mod catalog;
pub mod chimap_ui;
pub mod config;
pub mod map;
pub mod viewmodel;
pub mod wiki;

pub use viewmodel::ViewModelEvent;
