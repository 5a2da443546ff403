pub mod csv_table;
pub mod input;
pub mod sheets;

pub use csv_table::{read_table, read_table_from_path, write_table, write_table_to_path};
pub use input::load_input;
pub use sheets::google_sheet_csv_url;
