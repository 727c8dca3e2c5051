pub mod contact_form;
pub mod handlers;
pub mod header;
pub mod results;
pub mod upload_section;
pub mod utils;
