pub mod calendar;
pub mod detail;
pub mod header;
pub mod statusbar;
pub mod subjects;
