pub mod chat;
pub mod generate_report;
pub mod health_route;
pub mod index_dataset;
pub mod insights;
pub mod search_dataset;
pub mod suggest_charts;
