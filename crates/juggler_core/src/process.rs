//! Single-owner client handle onto the sequencer.

use crate::error::{CoreError, CoreResult};
use crate::sequencer::Sequencer;
use crate::types::{ResourceId, SequenceNumber};
use std::sync::Arc;

/// A handle bound to one sequence number.
///
/// The handle is neither `Clone` nor `Copy` and every operation takes
/// `&mut self`, so only one thread of control can drive it at a time. It is
/// `Send` and may be moved to the thread that uses it.
///
/// Once [`finish`](Self::finish) has been called, every other operation
/// fails with [`CoreError::Finished`] without contacting the sequencer.
/// Dropping an unfinished handle finishes it.
#[derive(Debug)]
pub struct ProcessHandle {
    sequencer: Arc<Sequencer>,
    seq: SequenceNumber,
    finished: bool,
}

impl ProcessHandle {
    pub(crate) fn new(sequencer: Arc<Sequencer>, seq: SequenceNumber) -> Self {
        Self {
            sequencer,
            seq,
            finished: false,
        }
    }

    /// Returns the sequence number this handle owns.
    #[must_use]
    pub fn seq(&self) -> SequenceNumber {
        self.seq
    }

    /// Returns true once [`finish`](Self::finish) has been called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Registers a read of `id`.
    pub fn read(&mut self, id: ResourceId) -> CoreResult<()> {
        self.ensure_unfinished()?;
        self.sequencer.register_read(self.seq, id)
    }

    /// Closes the read set.
    pub fn set_limited(&mut self) -> CoreResult<()> {
        self.ensure_unfinished()?;
        self.sequencer.set_limited(self.seq)
    }

    /// Blocks until this handle is admitted to write.
    pub fn request_commit(&mut self) -> CoreResult<()> {
        self.ensure_unfinished()?;
        self.sequencer.request_commit(self.seq)
    }

    /// Reports a completed write of `id`.
    pub fn report_write(&mut self, id: ResourceId) -> CoreResult<()> {
        self.ensure_unfinished()?;
        self.sequencer.report_write(self.seq, id)
    }

    /// Releases the handle from the sequencer.
    ///
    /// Idempotent: later calls succeed without contacting the sequencer.
    pub fn finish(&mut self) -> CoreResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.sequencer.finish(self.seq)
    }

    fn ensure_unfinished(&self) -> CoreResult<()> {
        if self.finished {
            Err(CoreError::finished(self.seq))
        } else {
            Ok(())
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(seq = %self.seq, error = %e, "finish on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer() -> Arc<Sequencer> {
        Arc::new(Sequencer::new())
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn handle_is_send() {
        assert_send::<ProcessHandle>();
    }

    #[test]
    fn read_two_write_one() {
        let sequencer = sequencer();
        let mut p = sequencer.new_process();
        p.read(100).unwrap();
        p.read(200).unwrap();
        let entry = sequencer.entry(p.seq()).unwrap();
        assert_eq!(entry.touched.len(), 2);
        assert!(!entry.committing);

        p.request_commit().unwrap();
        assert!(sequencer.entry(p.seq()).unwrap().committing);

        p.report_write(200).unwrap();
        p.finish().unwrap();
        assert_eq!(sequencer.active_count(), 0);
    }

    #[test]
    fn read_one_write_another() {
        let sequencer = sequencer();
        let mut p = sequencer.new_process();
        p.read(100).unwrap();
        p.request_commit().unwrap();
        p.report_write(200).unwrap();
        p.finish().unwrap();
    }

    #[test]
    fn limited_cannot_touch_new() {
        let sequencer = sequencer();
        let mut p = sequencer.new_process();
        p.read(100).unwrap();
        assert!(!sequencer.entry(p.seq()).unwrap().limited);
        p.set_limited().unwrap();
        assert!(sequencer.entry(p.seq()).unwrap().limited);

        p.read(100).unwrap();
        assert!(matches!(p.read(200), Err(CoreError::Limited { .. })));
        p.request_commit().unwrap();
        p.report_write(100).unwrap();
        assert!(matches!(p.report_write(200), Err(CoreError::Limited { .. })));
        p.finish().unwrap();
    }

    #[test]
    fn finished_handle_rejects_operations() {
        let sequencer = sequencer();
        let mut p = sequencer.new_process();
        p.finish().unwrap();
        p.finish().unwrap();
        assert!(p.is_finished());

        assert!(matches!(p.read(1), Err(CoreError::Finished { .. })));
        assert!(matches!(p.request_commit(), Err(CoreError::Finished { .. })));
        assert!(matches!(p.set_limited(), Err(CoreError::Finished { .. })));
        assert!(matches!(p.report_write(1), Err(CoreError::Finished { .. })));
        assert_eq!(sequencer.stats().finished(), 1);
    }

    #[test]
    fn not_in_charge() {
        let sequencer = sequencer();
        let mut p = sequencer.new_process();
        p.read(1).unwrap();
        assert!(matches!(p.report_write(1), Err(CoreError::NotInCharge { .. })));
    }

    #[test]
    fn dropped_handle_reports_dropped_until_finished() {
        let sequencer = sequencer();
        let mut p1 = sequencer.new_process();
        let mut p2 = sequencer.new_process();
        p1.read(1).unwrap();
        p2.read(1).unwrap();
        p1.request_commit().unwrap();
        p1.report_write(1).unwrap();

        assert!(p2.read(2).unwrap_err().is_dropped());
        assert!(p2.request_commit().unwrap_err().is_dropped());
        assert!(p2.report_write(1).unwrap_err().is_dropped());
        assert!(p2.set_limited().unwrap_err().is_dropped());
        assert!(p2.finish().is_ok());
    }

    #[test]
    fn drop_finishes_handle() {
        let sequencer = sequencer();
        let p = sequencer.new_process();
        let seq = p.seq();
        assert!(sequencer.is_active(seq));
        drop(p);
        assert!(!sequencer.is_active(seq));
        assert_eq!(sequencer.active_count(), 0);
    }
}
