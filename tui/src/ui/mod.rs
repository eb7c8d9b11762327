pub mod draw;
pub mod layout;
pub mod surface;
pub mod theme;
pub mod widgets;
