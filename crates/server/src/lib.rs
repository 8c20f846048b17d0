pub mod api;
pub mod shutdown;
pub mod state;
