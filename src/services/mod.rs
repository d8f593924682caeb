pub mod application_service;
pub mod availability_service;
pub mod conflict_service;
pub mod evaluation_service;
pub mod interview_service;
pub mod notification_service;
pub mod offer_service;
