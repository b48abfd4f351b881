//! Maps UI service errors to skycast_core::AppError for consistent user-facing messages.
//! Each service has its own module to keep mappings small and readable.

mod weather;

pub use weather::SEARCH_FAILED_MESSAGE;
