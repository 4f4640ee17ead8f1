// Export components
pub mod google_calendar;
pub mod link_store;
pub mod prompt;
