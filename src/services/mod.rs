pub mod account_service;
pub mod attempt_service;
pub mod catalog_service;
pub mod grading_service;
pub mod result_service;
pub mod session_service;
