//! Interior point solver main module.
//!
//! The [core](crate::solver::core) module holds the components shared by
//! any primal-dual method: the model trait, the linear solver backends
//! and the KKT assembly and regularization engine.  The
//! [interior point](crate::solver::implementations::interior_point)
//! implementation is built on top of them and is re-exported here.

pub mod core;
pub mod implementations;

//user facing traits and components
pub use crate::solver::core::{kkt, linsolvers, traits};
pub use crate::solver::core::kkt::{
    KktMatrix, Regularization, RegularizationError, RegularizationSettings,
    RegularizationSettingsBuilder,
};
pub use crate::solver::core::traits::NlpModel;
pub use crate::solver::core::{Bounds, Iterate, SettingsError};

pub use crate::solver::implementations::interior_point;
pub use crate::solver::implementations::interior_point::*;
