//! Reply rendering

mod reply;

pub use reply::{escape, render_error, render_marriage, Reply};
