pub mod formatter;
pub mod image;

pub use formatter::{ImageField, format_scraped_object};
pub use image::{ImageViewer, SystemViewer, decode_data_url};
