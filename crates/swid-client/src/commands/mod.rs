pub mod reconcile;
pub mod register;
pub mod show;
