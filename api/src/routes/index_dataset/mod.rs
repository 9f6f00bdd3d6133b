pub mod index_dataset_request;
pub mod index_dataset_response;
pub mod index_dataset_route;
