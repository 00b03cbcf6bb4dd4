// package together the core pieces used by the solver implementations:
// : model evaluation trait
// : iterate and bounds types
// : linear solver backends
// : kkt assembly and regularization
// : settings errors

pub mod kkt;
pub mod linsolvers;
pub mod traits;

mod settings;
mod variables;
pub use settings::*;
pub use variables::*;
