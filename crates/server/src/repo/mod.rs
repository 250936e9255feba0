pub mod activity_log;
pub mod case;
pub mod chat;
pub mod document;
pub mod invoice;
pub mod lawyer_request;
pub mod legal_service;
pub mod notification;
pub mod transaction;
pub mod user;
