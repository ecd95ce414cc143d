pub mod header;
pub mod view;

pub use header::RecordHeader;
pub use view::Record;
