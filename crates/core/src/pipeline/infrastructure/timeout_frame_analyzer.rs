use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};

use crate::pipeline::frame_analyzer::{FrameAnalysis, FrameAnalyzer, FrameAnomaly};
use crate::shared::constants::MAX_FRAME_TIMEOUT;
use crate::shared::frame::Frame;

type Job = (u64, Frame);
type Outcome = (u64, FrameAnalysis);

const RESULT_CAPACITY: usize = 4;

/// Bounds per-frame analysis time by running an inner analyzer on a worker
/// thread.
///
/// Layout: `caller → [job queue] → worker(inner.analyze) → [result queue] → caller`
///
/// When a frame exceeds the deadline it is reported as
/// [`FrameAnomaly::TimedOut`] with no regions, and the worker's late result
/// for it is discarded when it eventually arrives. Jobs are tagged with a
/// sequence number so a late result can never be attributed to a newer frame.
pub struct TimeoutFrameAnalyzer {
    job_tx: Option<Sender<Job>>,
    result_rx: Receiver<Outcome>,
    worker: Option<JoinHandle<()>>,
    timeout: Duration,
    next_seq: u64,
    stalled: bool,
}

impl TimeoutFrameAnalyzer {
    /// `timeout` is capped at [`MAX_FRAME_TIMEOUT`].
    pub fn new(inner: Box<dyn FrameAnalyzer>, timeout: Duration) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(1);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<Outcome>(RESULT_CAPACITY);
        let worker = spawn_worker(inner, job_rx, result_tx);
        Self {
            job_tx: Some(job_tx),
            result_rx,
            worker: Some(worker),
            timeout: timeout.min(MAX_FRAME_TIMEOUT),
            next_seq: 0,
            stalled: false,
        }
    }

    fn timed_out(&mut self, frame: &Frame) -> FrameAnalysis {
        self.stalled = true;
        log::warn!(
            "Frame {}: analysis exceeded {:?}, passing it through unanalyzed",
            frame.index(),
            self.timeout
        );
        FrameAnalysis::failed(FrameAnomaly::TimedOut(self.timeout), self.timeout)
    }
}

fn spawn_worker(
    mut inner: Box<dyn FrameAnalyzer>,
    job_rx: Receiver<Job>,
    result_tx: Sender<Outcome>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (seq, frame) in job_rx {
            let analysis = inner.analyze(&frame);
            if result_tx.send((seq, analysis)).is_err() {
                break;
            }
        }
    })
}

impl FrameAnalyzer for TimeoutFrameAnalyzer {
    fn analyze(&mut self, frame: &Frame) -> FrameAnalysis {
        // Anything already queued belongs to a frame we gave up on
        for (seq, _) in self.result_rx.try_iter() {
            log::debug!("Discarding late analysis for job {seq}");
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = Instant::now() + self.timeout;

        let Some(job_tx) = self.job_tx.as_ref() else {
            return FrameAnalysis::failed(
                FrameAnomaly::DetectionFailed("analysis worker stopped".into()),
                Duration::ZERO,
            );
        };
        match job_tx.send_deadline((seq, frame.clone()), deadline) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return self.timed_out(frame),
            Err(SendTimeoutError::Disconnected(_)) => {
                return FrameAnalysis::failed(
                    FrameAnomaly::DetectionFailed("analysis worker stopped".into()),
                    Duration::ZERO,
                )
            }
        }

        loop {
            match self.result_rx.recv_deadline(deadline) {
                Ok((got, analysis)) if got == seq => {
                    self.stalled = false;
                    return analysis;
                }
                Ok((stale, _)) => log::debug!("Discarding late analysis for job {stale}"),
                Err(RecvTimeoutError::Timeout) => return self.timed_out(frame),
                Err(RecvTimeoutError::Disconnected) => {
                    return FrameAnalysis::failed(
                        FrameAnomaly::DetectionFailed("analysis worker stopped".into()),
                        Duration::ZERO,
                    )
                }
            }
        }
    }
}

impl Drop for TimeoutFrameAnalyzer {
    fn drop(&mut self) {
        // Closing the job queue ends the worker loop
        self.job_tx = None;
        if let Some(worker) = self.worker.take() {
            // A stuck worker is left detached rather than blocking shutdown
            if !self.stalled {
                let _ = worker.join();
            }
        }
    }
}
