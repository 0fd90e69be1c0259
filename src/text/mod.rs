pub mod font;
pub mod fonts;
pub mod layout;
