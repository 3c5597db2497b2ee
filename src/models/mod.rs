// Data models and DTOs
// Database rows, API request/response shapes.

pub mod list;

pub use list::{Item, ItemResponse, List, ListCreatedResponse, ListId, NewItem};
