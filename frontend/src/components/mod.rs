pub mod address;
pub mod owners;
pub mod templates;
pub mod testing;
pub mod wizard;
