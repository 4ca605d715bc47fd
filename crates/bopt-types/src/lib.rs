pub mod bounds;
pub mod errors;
pub mod observation;

pub use bounds::*;
pub use errors::*;
pub use observation::*;
