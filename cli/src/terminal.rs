pub mod banner;
pub mod colors;
pub mod logging;
pub mod print;
pub mod progress;
pub mod title;
