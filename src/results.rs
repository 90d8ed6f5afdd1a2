mod data_table;
mod row;

pub use data_table::DataTable;
pub use row::DataRow;
