pub mod common;
pub mod form;
pub mod question;
pub mod response;
