pub mod movie;
pub mod validation;

pub use movie::*;
pub use validation::*;
