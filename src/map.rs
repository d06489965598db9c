pub mod chimap_egui;
pub mod coordinates;
pub mod markers;
pub mod popup;
