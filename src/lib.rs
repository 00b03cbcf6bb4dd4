//! __ipoa__ is a Rust implementation of a primal-dual interior point solver
//! for smooth nonlinear programs, together with an outer approximation
//! loop for mixed-integer nonlinear programs.
//!
//! The interior point solver addresses problems of the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & f(x)\\\\\[2ex\]
//!  \text{subject to} & c(x) = 0 \\\\\[1ex\]
//!         & d_l \le d(x) \le d_u \\\\\[1ex\]
//!         & x_l \le x \le x_u
//!  \end{array}
//! $$
//!
//! with $f$, $c$ and $d$ twice continuously differentiable.  Problem data
//! is supplied through the [`NlpModel`](crate::solver::traits::NlpModel)
//! trait.  Each Newton system is factored with a symmetric indefinite
//! $LDL^\top$ factorization.  When the system is singular or has the wrong
//! inertia, a diagonal regularization is added until the inertia matches
//! that of a nonconvex problem's local minimizer.
//!
//! ## Features
//!
//! * __Inertia correction__: primal and dual regularization of the KKT
//!   system, with configurable growth and retry limits.
//!
//! * __Interchangeable linear solvers__: a sparse QDLDL based backend with
//!   AMD ordering, and a dense Bunch-Kaufman backend that reports exact
//!   inertia including null eigenvalues.
//!
//! * __Outer approximation__: the [`outer_approx`] module alternates between
//!   a mixed-integer master problem and fixed-integer NLP subproblems,
//!   both solved by external solvers supplied through the
//!   [`MinlpProblem`](crate::outer_approx::MinlpProblem) trait.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod outer_approx;
pub mod qdldl;
pub mod solver;
pub mod timers;
