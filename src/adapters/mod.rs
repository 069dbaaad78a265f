// Adapters layer: concrete implementations for the collaborators the core
// consumes (files, question tables, fonts, raster images).

pub mod csv_source;
pub mod font;
pub mod raster;
pub mod storage;
