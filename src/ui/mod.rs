pub mod charts;
pub mod logos;
pub mod map_view;
pub mod panels;
