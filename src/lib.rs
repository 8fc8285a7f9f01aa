pub mod config;
pub mod document;
pub mod overlay;
pub mod override_series;
pub mod pipeline;
pub mod provider;
pub mod returns;
pub mod sink;
pub mod table;
pub mod yahoo;
