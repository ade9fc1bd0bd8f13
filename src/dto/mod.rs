pub mod api_response;
pub mod navigation_dto;
pub mod record_dto;

pub use api_response::ApiResponse;
