//! Export core modules shared by the exporter.

pub mod table;

#[cfg(feature = "excel")]
pub mod excel_core;
