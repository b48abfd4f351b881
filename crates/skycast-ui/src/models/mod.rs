pub mod home_model;
pub mod search_model;

pub use home_model::HomeModel;
pub use search_model::SearchModel;
