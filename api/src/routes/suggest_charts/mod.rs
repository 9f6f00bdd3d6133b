pub mod suggest_charts_request;
pub mod suggest_charts_response;
pub mod suggest_charts_route;
