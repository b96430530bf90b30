//! Data layer for DataTable/DataView architecture
//!
//! This module provides the data abstraction layer that separates
//! data storage from presentation.

// Core data modules
pub mod data_view;
pub mod datatable;
pub mod datavalue_compare;

// View stages
pub mod column_stats;
pub mod pagination;
pub mod range_filter;
pub mod search_filter;

// Output
pub mod data_exporter;
pub mod value_formatter;
