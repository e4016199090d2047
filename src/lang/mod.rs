//! # Block flow input
//!
//! This module defines the flow representation handed to the compiler by the
//! block editor. The editor flattens its block stacks into nested JSON lists;
//! ingestion decodes them once into typed blocks.
//!
//! ## Shape conventions
//!
//! - A block is `[opcode, args?, body?, elseBody?]`.
//! - `storein2_<name>` and `nameddo_<name>` are composite opcodes.
//! - `bool_<value>` and `box_<name>` are typed-literal argument encodings.

pub mod flow;
pub mod value;

pub use flow::{Arg, Block, FlowError, FlowTree, Head, Project};
pub use value::Value;
