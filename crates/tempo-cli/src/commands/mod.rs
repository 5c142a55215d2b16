pub mod end;
pub mod history;
pub mod reconcile;
pub mod sessions;
pub mod start;

mod context;
