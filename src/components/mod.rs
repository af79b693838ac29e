pub mod companies;
pub mod profile;
pub mod root;
pub mod wire;
