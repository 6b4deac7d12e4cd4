//! ObraApp Exchange - Spreadsheet backup format
//!
//! A backup is one workbook with a sheet per entity kind:
//! `Contratistas`, `Obras`, `Certificados`, `Pagos`. Header rows carry the
//! attribute names; a missing sheet imports as an empty collection.

pub mod error;
pub mod records;
pub mod sheet;
pub mod view;
pub mod workbook;

pub use error::*;
pub use sheet::*;
pub use view::*;
pub use workbook::*;
