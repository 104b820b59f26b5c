//! Strictly RPS - rock-paper-scissors round resolution.
//!
//! A round is any number (two or more) of players throwing at once.
//! Resolution is a pure function from the submitted moves to the set of
//! winners, with an empty set meaning a draw.
//!
//! # Example
//!
//! ```
//! use strictly_rps::{Move, resolve};
//!
//! let outcome = resolve([("alice", Move::Rock), ("bob", Move::Scissors)])?;
//! assert!(outcome.contains(&"alice"));
//! # Ok::<(), strictly_rps::InvalidRound>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod moves;
mod resolve;
mod round;

pub use error::InvalidRound;
pub use moves::Move;
pub use resolve::resolve;
pub use round::{Outcome, Round, MIN_PARTICIPANTS};
