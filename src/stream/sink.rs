//! Line Sinks
//!
//! Where completed records go while a stream is being parsed. A sink gets
//! every record as it is produced, then the full sequence once the input is
//! exhausted. Returning `ControlFlow::Break` from `emit` stops the parse.

use std::ops::ControlFlow;

use tokio::sync::mpsc;

use crate::parser::LineRecord;

/// Receiver of parsed lines
pub trait LineSink {
    /// Called once per record, in input order
    fn emit(&mut self, record: &LineRecord) -> ControlFlow<()>;

    /// Called once after the last record of a successful parse
    fn finish(&mut self, _records: &[LineRecord]) {}
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn emit(&mut self, record: &LineRecord) -> ControlFlow<()> {
        (**self).emit(record)
    }

    fn finish(&mut self, records: &[LineRecord]) {
        (**self).finish(records)
    }
}

/// Discards notifications; results are still returned by the parse call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LineSink for NullSink {
    fn emit(&mut self, _record: &LineRecord) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Forwards each record to a callback
pub struct FnSink<F>(pub F);

impl<F> LineSink for FnSink<F>
where
    F: FnMut(&LineRecord) -> ControlFlow<()>,
{
    fn emit(&mut self, record: &LineRecord) -> ControlFlow<()> {
        (self.0)(record)
    }
}

/// Sends each record over an unbounded channel
///
/// Dropping the receiver cancels the parse.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<LineRecord>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<LineRecord>) -> Self {
        Self { sender }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LineRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl LineSink for ChannelSink {
    fn emit(&mut self, record: &LineRecord) -> ControlFlow<()> {
        match self.sender.send(record.clone()) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => {
                log::debug!("Line receiver dropped, stopping");
                ControlFlow::Break(())
            }
        }
    }
}
