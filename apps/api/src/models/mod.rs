pub mod resume;
pub mod schedule;
pub mod settings;
pub mod task;
pub mod wall_clock;
pub mod wishlist;
