//! Grouping parsed lines into streams
//!
//! The script grammar yields a flat list of lines. This pass walks them in order,
//! opens a stream at every header, and attaches statements and comments to the stream
//! that is open. It is also where the structural rules are enforced:
//!
//! - statements other than properties need an open stream
//! - `accepted` must follow an `accept` stream and must contain statements
//! - under strict ordering, reads, writes and barriers must come after the stream's
//!   completion event (`connected`, or `bound` for accept streams)

use super::error::{ParseError, ParseErrorKind};
use super::grammar::{Line, LineItem, StreamHeader};
use crate::script::ast::{
    AcceptNode, AcceptedNode, AstNode, CommentNode, ConnectNode, PreambleNode, RegionInfo,
    ScriptNode, StreamNode, StreamableNode,
};
use crate::script::config::{OrderingPolicy, ParserConfig};
use tracing::trace;

/// Rules applied while assembling
#[derive(Debug, Clone, Copy)]
pub(crate) struct Assembly {
    pub ordering: OrderingPolicy,
    pub preserve_comments: bool,
    /// Allow `accepted` without a preceding `accept`, for stream fragments
    pub standalone_accepted: bool,
}

impl Assembly {
    pub fn script(config: &ParserConfig) -> Self {
        Self {
            ordering: config.ordering,
            preserve_comments: config.preserve_comments,
            standalone_accepted: false,
        }
    }

    pub fn fragment(config: &ParserConfig) -> Self {
        Self {
            standalone_accepted: true,
            ..Self::script(config)
        }
    }
}

struct OpenStream {
    node: StreamNode,
    span_start: usize,
    span_end: usize,
    regions: Vec<RegionInfo>,
    completed: bool,
    statements: usize,
}

impl OpenStream {
    fn open(header: StreamHeader, region: &RegionInfo) -> Self {
        let node = match header {
            StreamHeader::Accept {
                location,
                accept_name,
            } => StreamNode::Accept(AcceptNode {
                location,
                accept_name,
                streamables: Vec::new(),
            }),
            StreamHeader::Accepted { accept_name } => StreamNode::Accepted(AcceptedNode {
                accept_name,
                streamables: Vec::new(),
            }),
            StreamHeader::Connect { location } => StreamNode::Connect(ConnectNode {
                location,
                streamables: Vec::new(),
            }),
        };

        Self {
            node,
            span_start: region.start(),
            span_end: region.end(),
            regions: Vec::new(),
            completed: false,
            statements: 0,
        }
    }

    fn push(
        &mut self,
        statement: StreamableNode,
        region: RegionInfo,
        source: &str,
        rules: &Assembly,
    ) -> Result<(), ParseError> {
        let completion = self.node.completion_event();

        if statement.as_event() == Some(completion) {
            self.completed = true;
        }

        if statement.requires_connection()
            && !self.completed
            && rules.ordering == OrderingPolicy::Strict
        {
            return Err(ParseError::at(
                ParseErrorKind::Ordering,
                source,
                region.start(),
                format!(
                    "`{}` before `{}` in {} stream",
                    statement_label(&statement),
                    completion,
                    self.node.keyword()
                ),
            ));
        }

        self.statements += 1;
        self.append(statement, region);
        Ok(())
    }

    fn push_comment(&mut self, comment: CommentNode, region: RegionInfo) {
        self.append(StreamableNode::Comment(comment), region);
    }

    fn append(&mut self, node: StreamableNode, region: RegionInfo) {
        self.span_end = self.span_end.max(region.end());
        self.node.streamables_mut().push(node);
        self.regions.push(region);
    }

    fn finish(self, source: &str) -> Result<(StreamNode, RegionInfo), ParseError> {
        if matches!(self.node, StreamNode::Accepted(_)) && self.statements == 0 {
            return Err(ParseError::at(
                ParseErrorKind::Syntax,
                source,
                self.span_start,
                "`accepted` stream has no statements",
            ));
        }

        trace!(
            stream = self.node.keyword(),
            streamables = self.node.streamables().len(),
            "assembled stream"
        );

        let region = RegionInfo::sequential(self.span_start..self.span_end, self.regions);
        Ok((self.node, region))
    }
}

/// Name of a statement as written, for messages
fn statement_label(statement: &StreamableNode) -> String {
    match statement {
        StreamableNode::Barrier(barrier) => barrier.kind.to_string(),
        StreamableNode::Event(kind) => kind.to_string(),
        other => other.node_kind().to_string(),
    }
}

pub(crate) fn assemble(
    lines: Vec<Line>,
    source: &str,
    rules: &Assembly,
) -> Result<(ScriptNode, RegionInfo), ParseError> {
    let mut script = ScriptNode::default();
    let mut regions = Vec::new();
    let mut current: Option<OpenStream> = None;
    let mut seen_accept = false;

    for line in lines {
        if let Some((item, region)) = line.item {
            match item {
                LineItem::Header(header) => {
                    match &header {
                        StreamHeader::Accept { .. } => seen_accept = true,
                        StreamHeader::Accepted { .. }
                            if !seen_accept && !rules.standalone_accepted =>
                        {
                            return Err(ParseError::at(
                                ParseErrorKind::Ordering,
                                source,
                                region.start(),
                                "`accepted` stream must follow an `accept` stream",
                            ));
                        }
                        _ => {}
                    }

                    if let Some(open) = current.take() {
                        let (stream, stream_region) = open.finish(source)?;
                        script.streams.push(stream);
                        regions.push(stream_region);
                    }
                    current = Some(OpenStream::open(header, &region));
                }
                LineItem::Statement(statement) => match current.as_mut() {
                    Some(open) => open.push(statement, region, source, rules)?,
                    None => match statement {
                        StreamableNode::Property(property) => {
                            script.preamble.push(PreambleNode::Property(property));
                            regions.push(region);
                        }
                        other => {
                            return Err(ParseError::at(
                                ParseErrorKind::Ordering,
                                source,
                                region.start(),
                                format!(
                                    "`{}` outside of a stream; streams begin with `accept` or `connect`",
                                    statement_label(&other)
                                ),
                            ));
                        }
                    },
                },
            }
        }

        if let Some((comment, region)) = line.comment {
            if !rules.preserve_comments {
                continue;
            }
            match current.as_mut() {
                Some(open) => open.push_comment(comment, region),
                None => {
                    script.preamble.push(PreambleNode::Comment(comment));
                    regions.push(region);
                }
            }
        }
    }

    if let Some(open) = current.take() {
        let (stream, stream_region) = open.finish(source)?;
        script.streams.push(stream);
        regions.push(stream_region);
    }

    Ok((script, RegionInfo::sequential(0..source.len(), regions)))
}
