pub mod generate_report_response;
pub mod generate_report_route;
