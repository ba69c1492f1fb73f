// UI module
// Window layout, connect form, chat view and shared components

pub mod components;
pub mod layout;

pub use layout::render_app_layout;
