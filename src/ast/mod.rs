//! Parsed query model consumed by the translator.
//!
//! Everything here is plain data: the front-end parser (or any external
//! parser handing the tree over as JSON) builds it, the translator reads it.

pub mod expr;
pub mod operators;
pub mod options;
pub mod order;

pub use self::expr::Expr;
pub use self::operators::BinaryOperator;
pub use self::options::QueryOptions;
pub use self::order::OrderStep;
