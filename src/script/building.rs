//! Programmatic construction of script trees
//!
//! Builders mirror the grammar one-to-one. Opening a child scope (`add_connect_stream`,
//! `add_read_event`, ...) hands the current builder to the child as its parent; the
//! child's `done()` appends the finished node to that parent and returns it, so calls
//! chain in the same nesting as the source text:
//!
//! ```ignore
//! let script = ScriptBuilder::new()
//!     .add_connect_stream()
//!         .set_location(Location::parse("tcp://localhost:8080")?)
//!         .add_connected_event()
//!         .add_read_event()
//!             .add_short_length_bytes()
//!             .capture("len")
//!             .done()
//!         .add_close_command()
//!         .done()
//!     .done();
//! ```
//!
//! Builders never produce region info. Misuse (a missing location, a capture on a
//! matcher that cannot capture, a setter called twice) is a programming error and
//! panics with a message.

mod command;
mod script;
mod stream;

pub use command::{ReadBuilder, WriteBuilder};
pub use script::ScriptBuilder;
pub use stream::{AcceptStreamBuilder, AcceptedStreamBuilder, ConnectStreamBuilder};

/// A builder scope that accepts a finished child node
pub trait Parent<T> {
    type Output;

    fn adopt(self, child: T) -> Self::Output;
}

/// The outermost scope: `done()` yields the node itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Root;

impl<T> Parent<T> for Root {
    type Output = T;

    fn adopt(self, child: T) -> T {
        child
    }
}
