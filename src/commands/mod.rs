pub mod filters;
pub mod list;
pub mod mutate;
