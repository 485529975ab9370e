pub mod event;
pub mod level;
pub mod menu;
pub mod narration;
pub mod step;
pub mod world;
