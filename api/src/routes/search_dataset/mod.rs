pub mod search_dataset_request;
pub mod search_dataset_response;
pub mod search_dataset_route;
