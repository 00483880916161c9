pub mod heatmap;

pub use heatmap::{default_calendar_range, month_range, range_heatmap, DayRate};
