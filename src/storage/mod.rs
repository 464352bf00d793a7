pub mod format;
pub mod image_io;
pub mod table;
