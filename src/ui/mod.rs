// Terminal presentation of the data view
pub mod table_renderer;
