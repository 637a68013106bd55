//! # QUBO
//!
//! $$
//! \min_{\mathbf{x}\in\{0,1\}^n} \mathbf{x}^\top Q \mathbf{x}
//! $$
//!
//! Construction of the portfolio-selection QUBO matrix and the shared tools to
//! evaluate and re-express it.

pub mod builder;
pub mod form;
pub mod program;

pub use builder::build_qubo;
pub use builder::validate_inputs;
pub use form::check_binary;
pub use form::check_square;
pub use form::quadratic_form;
pub use form::rescale_to_max_abs;
pub use program::QuadraticProgram;
pub use program::QuadraticTerm;
