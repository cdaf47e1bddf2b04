//! Stream builders
//!
//! The three stream kinds share every statement method; only their headers differ.

use super::command::{ReadBuilder, WriteBuilder};
use super::{Parent, Root};
use crate::script::ast::{
    AcceptNode, AcceptedNode, BarrierKind, BarrierNode, CommentNode, ConnectNode, EventKind,
    Location, OptionNode, PropertyNode, ReadNode, StreamableNode, Value, WriteNode,
};

macro_rules! streamable_methods {
    ($builder:ident) => {
        impl<P> $builder<P> {
            pub fn add_streamable(mut self, node: impl Into<StreamableNode>) -> Self {
                self.streamables.push(node.into());
                self
            }

            fn add_event(self, kind: EventKind) -> Self {
                self.add_streamable(kind)
            }

            pub fn add_opened_event(self) -> Self {
                self.add_event(EventKind::Opened)
            }

            pub fn add_bound_event(self) -> Self {
                self.add_event(EventKind::Bound)
            }

            pub fn add_connected_event(self) -> Self {
                self.add_event(EventKind::Connected)
            }

            pub fn add_child_opened_event(self) -> Self {
                self.add_event(EventKind::ChildOpened)
            }

            pub fn add_child_closed_event(self) -> Self {
                self.add_event(EventKind::ChildClosed)
            }

            pub fn add_unbound_event(self) -> Self {
                self.add_event(EventKind::Unbound)
            }

            pub fn add_disconnected_event(self) -> Self {
                self.add_event(EventKind::Disconnected)
            }

            pub fn add_closed_event(self) -> Self {
                self.add_event(EventKind::Closed)
            }

            /// Open a `read`; its `done()` returns to this stream
            pub fn add_read_event(self) -> ReadBuilder<Self> {
                ReadBuilder::within(self)
            }

            /// Open a `write`; its `done()` returns to this stream
            pub fn add_write_command(self) -> WriteBuilder<Self> {
                WriteBuilder::within(self)
            }

            pub fn add_close_command(self) -> Self {
                self.add_streamable(StreamableNode::Close)
            }

            fn add_barrier(self, kind: BarrierKind, name: String) -> Self {
                if name.is_empty() {
                    panic!("`{kind}` needs a barrier name");
                }
                self.add_streamable(BarrierNode { kind, name })
            }

            pub fn add_read_await_barrier(self, name: impl Into<String>) -> Self {
                self.add_barrier(BarrierKind::ReadAwait, name.into())
            }

            pub fn add_read_notify_barrier(self, name: impl Into<String>) -> Self {
                self.add_barrier(BarrierKind::ReadNotify, name.into())
            }

            pub fn add_write_await_barrier(self, name: impl Into<String>) -> Self {
                self.add_barrier(BarrierKind::WriteAwait, name.into())
            }

            pub fn add_write_notify_barrier(self, name: impl Into<String>) -> Self {
                self.add_barrier(BarrierKind::WriteNotify, name.into())
            }

            pub fn add_property(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
                self.add_streamable(PropertyNode {
                    name: name.into(),
                    value: value.into(),
                })
            }

            pub fn add_read_option(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
                self.add_streamable(StreamableNode::ReadOption(OptionNode {
                    name: name.into(),
                    value: value.into(),
                }))
            }

            pub fn add_write_option(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
                self.add_streamable(StreamableNode::WriteOption(OptionNode {
                    name: name.into(),
                    value: value.into(),
                }))
            }

            /// `text` is everything after `#`, spacing included
            pub fn add_comment(self, text: impl Into<String>) -> Self {
                self.add_streamable(CommentNode::new(text))
            }
        }

        impl<P> Parent<ReadNode> for $builder<P> {
            type Output = Self;

            fn adopt(self, child: ReadNode) -> Self {
                self.add_streamable(child)
            }
        }

        impl<P> Parent<WriteNode> for $builder<P> {
            type Output = Self;

            fn adopt(self, child: WriteNode) -> Self {
                self.add_streamable(child)
            }
        }
    };
}

fn set_once<T>(slot: &mut Option<T>, value: T, what: &str) {
    if slot.is_some() {
        panic!("{what} is already set");
    }
    *slot = Some(value);
}

/// `accept LOCATION [as NAME]`
#[derive(Debug)]
pub struct AcceptStreamBuilder<P = Root> {
    parent: P,
    location: Option<Location>,
    accept_name: Option<String>,
    streamables: Vec<StreamableNode>,
}

impl AcceptStreamBuilder<Root> {
    pub fn new() -> Self {
        Self::within(Root)
    }
}

impl Default for AcceptStreamBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> AcceptStreamBuilder<P> {
    pub(crate) fn within(parent: P) -> Self {
        Self {
            parent,
            location: None,
            accept_name: None,
            streamables: Vec::new(),
        }
    }

    pub fn set_location(mut self, location: impl Into<Location>) -> Self {
        set_once(&mut self.location, location.into(), "accept location");
        self
    }

    pub fn set_accept_name(mut self, name: impl Into<String>) -> Self {
        set_once(&mut self.accept_name, name.into(), "accept name");
        self
    }

    /// Panics when no location was set
    pub fn done(self) -> P::Output
    where
        P: Parent<AcceptNode>,
    {
        let Some(location) = self.location else {
            panic!("accept stream needs a location before done()");
        };
        self.parent.adopt(AcceptNode {
            location,
            accept_name: self.accept_name,
            streamables: self.streamables,
        })
    }
}

streamable_methods!(AcceptStreamBuilder);

/// `accepted [NAME]`
#[derive(Debug)]
pub struct AcceptedStreamBuilder<P = Root> {
    parent: P,
    accept_name: Option<String>,
    streamables: Vec<StreamableNode>,
}

impl AcceptedStreamBuilder<Root> {
    pub fn new() -> Self {
        Self::within(Root)
    }
}

impl Default for AcceptedStreamBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> AcceptedStreamBuilder<P> {
    pub(crate) fn within(parent: P) -> Self {
        Self {
            parent,
            accept_name: None,
            streamables: Vec::new(),
        }
    }

    pub fn set_accept_name(mut self, name: impl Into<String>) -> Self {
        set_once(&mut self.accept_name, name.into(), "accepted name");
        self
    }

    pub fn done(self) -> P::Output
    where
        P: Parent<AcceptedNode>,
    {
        self.parent.adopt(AcceptedNode {
            accept_name: self.accept_name,
            streamables: self.streamables,
        })
    }
}

streamable_methods!(AcceptedStreamBuilder);

/// `connect LOCATION`
#[derive(Debug)]
pub struct ConnectStreamBuilder<P = Root> {
    parent: P,
    location: Option<Location>,
    streamables: Vec<StreamableNode>,
}

impl ConnectStreamBuilder<Root> {
    pub fn new() -> Self {
        Self::within(Root)
    }
}

impl Default for ConnectStreamBuilder<Root> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ConnectStreamBuilder<P> {
    pub(crate) fn within(parent: P) -> Self {
        Self {
            parent,
            location: None,
            streamables: Vec::new(),
        }
    }

    pub fn set_location(mut self, location: impl Into<Location>) -> Self {
        set_once(&mut self.location, location.into(), "connect location");
        self
    }

    /// Panics when no location was set
    pub fn done(self) -> P::Output
    where
        P: Parent<ConnectNode>,
    {
        let Some(location) = self.location else {
            panic!("connect stream needs a location before done()");
        };
        self.parent.adopt(ConnectNode {
            location,
            streamables: self.streamables,
        })
    }
}

streamable_methods!(ConnectStreamBuilder);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ast::Expression;

    fn location() -> Location {
        Location::parse("tcp://localhost:8001").unwrap()
    }

    #[test]
    fn test_accept_stream_header() {
        let accept = AcceptStreamBuilder::new()
            .set_location(location())
            .set_accept_name("server")
            .add_bound_event()
            .done();
        assert_eq!(accept.accept_name.as_deref(), Some("server"));
        assert_eq!(accept.streamables, vec![StreamableNode::Event(EventKind::Bound)]);
    }

    #[test]
    fn test_expression_location() {
        let connect = ConnectStreamBuilder::new()
            .set_location(Expression::any("${location}"))
            .done();
        assert!(connect.location.as_url().is_none());
    }

    #[test]
    fn test_statements_keep_order() {
        let accepted = AcceptedStreamBuilder::new()
            .add_connected_event()
            .add_comment(" greeting")
            .add_write_command()
            .add_literal_text("hi")
            .done()
            .add_write_notify_barrier("SENT")
            .done();
        assert_eq!(accepted.streamables.len(), 4);
        assert!(accepted.streamables[1].is_comment());
    }

    #[test]
    #[should_panic(expected = "needs a location")]
    fn test_connect_without_location_panics() {
        ConnectStreamBuilder::new().add_connected_event().done();
    }

    #[test]
    #[should_panic(expected = "already set")]
    fn test_location_set_twice_panics() {
        ConnectStreamBuilder::new()
            .set_location(location())
            .set_location(location());
    }
}
