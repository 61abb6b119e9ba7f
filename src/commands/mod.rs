pub mod analytics;
pub mod property;
pub mod renovation;
pub mod sale;
pub mod util;
