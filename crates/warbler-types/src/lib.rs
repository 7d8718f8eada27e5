//! Shapes shared between the HTTP layer and the templates: form payloads
//! arriving from the browser and view models handed to tera.

pub mod forms;
pub mod views;
