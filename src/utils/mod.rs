pub mod display;

pub use display::prepare_text_for_display;
