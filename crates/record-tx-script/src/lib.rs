//! # Record TX Script
//!
//! Loading compiled validators from a blueprint and turning them into
//! concrete, uniquely parameterized scripts.
//!
//! ## Flow
//!
//! 1. [`Blueprint::from_path`] loads `plutus.json` once
//! 2. [`ScriptParameterizer`] holds it behind an `Arc` and looks validators up by title
//! 3. The compiled code is decoded from flat ([`uplc::Program`]), the
//!    parameters are applied as data constants, and the result re-encoded
//! 4. [`AppliedScript`] exposes the hash, policy id and script address
//!
//! Everything here is synchronous and pure apart from reading the blueprint
//! file.

pub mod blueprint;
pub mod error;
pub mod flat;
pub mod parameterize;
pub mod script;
pub mod uplc;

pub use blueprint::{Blueprint, Parameter, Preamble, Validator};
pub use error::{Result, ScriptError};
pub use parameterize::{AppliedScript, ScriptParameterizer};
pub use script::{Script, ScriptType};
