pub mod insights_request;
pub mod insights_response;
pub mod insights_route;
