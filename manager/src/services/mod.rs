pub mod action_service;

pub use action_service::{ActionService, ActionView};
