//! # Capture Tree
//!
//! Hierarchical view over a captured stream of graphics API calls.
//!
//! ## Architecture
//!
//! ```text
//! Capture (linear command list)
//!     │
//!     ├──> TreeSpec (group ranges layered over the commands)
//!     │      └─ build() nests groups, leaves index into the capture
//!     │
//!     ├──> CommandTree
//!     │      ├─ Nodes: Group { name, items } | Command(index)
//!     │      └─ traverse(): forward pre-order or its reverse, from any address
//!     │
//!     └──> Database (content-addressed)
//!            ├─ CaptureResolver: id -> Arc<Capture>
//!            └─ TreeResolver: id -> Arc<CommandTree>, built at most once
//! ```

mod builder;
mod database;
mod error;
mod tree;
mod types;

pub use builder::{GroupRange, TreeSpec};
pub use database::{CaptureResolver, Database, TreeResolver};
pub use error::{ResolveError, Result, TreeError};
pub use tree::{CommandTree, Traversal, Visit};
pub use types::{Capture, Command, Group, Node, Param};
