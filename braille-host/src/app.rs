//! Host poll loop
//!
//! One pass reads at most one control line from the display unit, turns it
//! into an opcode and carries out whatever the dispatcher decides. Nothing
//! that goes wrong inside a pass stops the loop.

use std::fmt::Debug;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use braille_core::{Link, LinkError};
use braille_hal::{UartRx, UartTx};
use braille_protocol::{Frame, Opcode};

use crate::alert::AlertMailbox;
use crate::capture::SpeechCapture;
use crate::config::HostConfig;
use crate::dispatch::{Directive, Dispatcher, Grade};
use crate::translate::{BrailleText, Grade1Translator, Grade2Translator};

/// What one [`Host::poll_once`] call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Opcode read from the unit, `Idle` when nothing usable arrived
    pub opcode: Opcode,
    /// The capture pipeline ran
    pub captured: bool,
    /// Frames handed to the link (ordinary and alert)
    pub frames_sent: usize,
    /// A pending alert was written
    pub alert_sent: bool,
    /// The microphone was recalibrated
    pub recalibrated: bool,
}

/// Host-side pipeline
pub struct Host<U, C, G1, G2> {
    link: Link<U>,
    dispatcher: Dispatcher,
    text: BrailleText<G1, G2>,
    capture: C,
    poll_interval: Duration,
    post_capture_pause: Duration,
}

impl<U, C, G1, G2> Host<U, C, G1, G2>
where
    U: UartTx + UartRx,
    <U as UartTx>::Error: Debug,
    <U as UartRx>::Error: Debug,
    C: SpeechCapture,
    G1: Grade1Translator,
    G2: Grade2Translator,
{
    /// Assemble the host and run the start-up calibration
    pub fn new(
        config: &HostConfig,
        link: Link<U>,
        text: BrailleText<G1, G2>,
        capture: C,
        mailbox: Arc<AlertMailbox>,
        now: Instant,
    ) -> Self {
        let mut host = Self {
            link,
            dispatcher: Dispatcher::new(mailbox, config.recalibrate_after(), now),
            text,
            capture,
            poll_interval: config.poll_interval(),
            post_capture_pause: config.post_capture_pause(),
        };
        host.calibrate(now);
        host
    }

    /// Current translation grade
    pub fn grade(&self) -> Grade {
        self.dispatcher.grade()
    }

    /// Borrow the link
    pub fn link(&self) -> &Link<U> {
        &self.link
    }

    /// Mutably borrow the link
    pub fn link_mut(&mut self) -> &mut Link<U> {
        &mut self.link
    }

    /// Mutably borrow the speech capture
    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    /// Poll forever
    pub fn run(&mut self) -> ! {
        tracing::info!(grade = ?self.grade(), "waiting for the display unit");
        loop {
            let outcome = self.poll_once(Instant::now());
            if outcome.captured {
                thread::sleep(self.post_capture_pause);
            } else {
                thread::sleep(self.poll_interval);
            }
        }
    }

    /// One pass of the loop
    pub fn poll_once(&mut self, now: Instant) -> PollOutcome {
        let opcode = self.read_opcode();
        let mut outcome = PollOutcome {
            opcode,
            ..PollOutcome::default()
        };

        match self.dispatcher.dispatch(opcode, now) {
            Directive::Capture => {
                outcome.captured = true;
                if self.run_capture() {
                    outcome.frames_sent += 1;
                }
            }
            Directive::GradeChanged(grade) => {
                tracing::info!(?grade, "translation grade changed");
            }
            Directive::Idle { alert, recalibrate } => {
                if let Some(text) = alert {
                    if self.send_alert(&text) {
                        outcome.alert_sent = true;
                        outcome.frames_sent += 1;
                    }
                }
                if recalibrate {
                    self.calibrate(now);
                    outcome.recalibrated = true;
                }
            }
        }

        outcome
    }

    fn read_opcode(&mut self) -> Opcode {
        match self.link.poll_line() {
            Ok(Some(line)) => {
                let line = String::from_utf8_lossy(&line);
                let opcode = Opcode::from_line(&line);
                tracing::trace!(%line, opcode = opcode.as_str(), "control line");
                opcode
            }
            Ok(None) => Opcode::Idle,
            Err(LinkError::Overrun) => {
                tracing::warn!("over-long line from the display unit dropped");
                Opcode::Idle
            }
            Err(e) => {
                tracing::warn!(error = ?e, "serial read failed");
                Opcode::Idle
            }
        }
    }

    /// Capture, encode and send one utterance; returns true if a frame went out
    fn run_capture(&mut self) -> bool {
        tracing::debug!("recording");
        let sent = match self.capture.capture() {
            Ok(text) => {
                tracing::debug!(%text, "recognised");
                let grid = self.text.encode(&text, self.dispatcher.grade());
                self.send(&Frame::ordinary(grid))
            }
            Err(e) => {
                tracing::warn!("recognition failed: {e}");
                false
            }
        };

        // Button presses made while recording are stale
        match self.link.drain() {
            Ok(0) => {}
            Ok(n) => tracing::debug!(bytes = n, "drained stale input"),
            Err(e) => tracing::warn!(error = ?e, "drain failed"),
        }
        tracing::debug!("done recording");
        sent
    }

    fn send_alert(&mut self, text: &str) -> bool {
        let grid = self.text.encode(text, self.dispatcher.grade());
        let sent = self.send(&Frame::alert(grid));
        if sent {
            tracing::info!(%text, "alert sent");
        }
        sent
    }

    fn send(&mut self, frame: &Frame) -> bool {
        match self.link.send_frame(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = ?e, priority = ?frame.priority, "frame not sent");
                false
            }
        }
    }

    fn calibrate(&mut self, now: Instant) {
        tracing::debug!("calibrating");
        match self.capture.calibrate() {
            Ok(()) => tracing::debug!("calibrated"),
            Err(e) => tracing::warn!("calibration failed: {e}"),
        }
        // A failed calibration is not retried until the next interval
        self.dispatcher.mark_calibrated(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::RecognitionError;
    use crate::translate::Alphabet;
    use braille_protocol::{Cell, FRAME_LEN};
    use std::collections::VecDeque;

    /// In-memory serial line
    #[derive(Default)]
    struct ScriptedUart {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
        fail_writes: bool,
    }

    impl ScriptedUart {
        fn sent_lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.tx)
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    impl UartTx for ScriptedUart {
        type Error = &'static str;

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail_writes {
                return Err("unplugged");
            }
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl UartRx for ScriptedUart {
        type Error = &'static str;

        fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.rx.len());
            for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    /// Capture that replays canned results
    #[derive(Default)]
    struct ScriptedCapture {
        utterances: VecDeque<Result<String, RecognitionError>>,
        captures: usize,
        calibrations: usize,
    }

    impl SpeechCapture for ScriptedCapture {
        fn calibrate(&mut self) -> Result<(), RecognitionError> {
            self.calibrations += 1;
            Ok(())
        }

        fn capture(&mut self) -> Result<String, RecognitionError> {
            self.captures += 1;
            self.utterances
                .pop_front()
                .unwrap_or(Err(RecognitionError::NoSpeech))
        }
    }

    type TestHost = Host<ScriptedUart, ScriptedCapture, Alphabet, Alphabet>;

    fn host(utterances: &[&str]) -> (TestHost, Arc<AlertMailbox>, Instant) {
        let mailbox = Arc::new(AlertMailbox::new());
        let capture = ScriptedCapture {
            utterances: utterances.iter().map(|u| Ok(u.to_string())).collect(),
            ..ScriptedCapture::default()
        };
        let start = Instant::now();
        let host = Host::new(
            &HostConfig::default(),
            Link::new(ScriptedUart::default()),
            BrailleText::default(),
            capture,
            mailbox.clone(),
            start,
        );
        (host, mailbox, start)
    }

    fn unit_says(host: &mut TestHost, line: &str) {
        let rx = &mut host.link_mut().uart_mut().rx;
        rx.extend(line.bytes());
        rx.push_back(b'\n');
    }

    fn sent(host: &TestHost) -> Vec<String> {
        host.link().uart().sent_lines()
    }

    #[test]
    fn test_calibrates_at_startup() {
        let (mut host, _, _) = host(&[]);
        assert_eq!(host.capture_mut().calibrations, 1);
    }

    #[test]
    fn test_idle_send_idle_captures_once() {
        let (mut host, _, t) = host(&["hi"]);

        let first = host.poll_once(t);
        unit_says(&mut host, "SEND");
        let second = host.poll_once(t);
        let third = host.poll_once(t);

        assert_eq!(first.opcode, Opcode::Idle);
        assert_eq!(second.opcode, Opcode::Send);
        assert_eq!(third.opcode, Opcode::Idle);
        assert!(!first.captured && second.captured && !third.captured);
        assert_eq!(host.capture_mut().captures, 1);

        let lines = sent(&host);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), FRAME_LEN);
        assert!(lines[0].starts_with('0'));
        assert!(!lines.iter().any(|l| l.starts_with('1')));
    }

    #[test]
    fn test_captured_text_reaches_the_wire() {
        let (mut host, _, t) = host(&["hi"]);
        unit_says(&mut host, "SEND");
        host.poll_once(t);

        let frame = Frame::decode(sent(&host)[0].as_bytes()).unwrap();
        assert_eq!(frame.grid.cell(0).map(Cell::mask), Some(0x13));
        assert_eq!(frame.grid.cell(1).map(Cell::mask), Some(0x0a));
        assert!(frame.grid.cells()[2..].iter().all(Cell::is_blank));
    }

    #[test]
    fn test_alert_sent_once_and_cleared() {
        let (mut host, mailbox, t) = host(&[]);
        mailbox.post("ALERT DOG");

        let first = host.poll_once(t);
        let second = host.poll_once(t);

        assert!(first.alert_sent);
        assert!(!second.alert_sent);
        assert!(!mailbox.is_pending());

        let lines = sent(&host);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('1'));
        assert_eq!(lines[0].len(), FRAME_LEN);
    }

    #[test]
    fn test_alert_waits_for_idle_poll() {
        let (mut host, mailbox, t) = host(&["hello"]);
        mailbox.post("ALERT GUN");
        unit_says(&mut host, "SEND");

        let outcome = host.poll_once(t);
        assert!(outcome.captured && !outcome.alert_sent);
        assert!(mailbox.is_pending());

        assert!(host.poll_once(t).alert_sent);
    }

    #[test]
    fn test_grade_lines_switch_encoding() {
        let (mut host, _, t) = host(&["ab c"]);
        unit_says(&mut host, "True");
        assert_eq!(host.poll_once(t).opcode, Opcode::Grade2);
        assert_eq!(host.grade(), Grade::Two);

        unit_says(&mut host, "SEND");
        host.poll_once(t);
        let frame = Frame::decode(sent(&host)[0].as_bytes()).unwrap();
        // a b _ c _
        let masks: Vec<u8> = frame.grid.cells()[..5].iter().map(Cell::mask).collect();
        assert_eq!(masks, vec![0x01, 0x03, 0x00, 0x09, 0x00]);

        unit_says(&mut host, "False");
        host.poll_once(t);
        assert_eq!(host.grade(), Grade::One);
    }

    #[test]
    fn test_unknown_line_is_idle() {
        let (mut host, _, t) = host(&[]);
        unit_says(&mut host, "send");
        let outcome = host.poll_once(t);
        assert_eq!(outcome.opcode, Opcode::Idle);
        assert!(!outcome.captured);
    }

    #[test]
    fn test_failed_recognition_sends_nothing() {
        let (mut host, _, t) = host(&[]);
        unit_says(&mut host, "SEND");
        let outcome = host.poll_once(t);
        assert!(outcome.captured);
        assert_eq!(outcome.frames_sent, 0);
        assert!(sent(&host).is_empty());
    }

    #[test]
    fn test_stale_presses_drained_after_capture() {
        let (mut host, _, t) = host(&["hi", "again"]);
        unit_says(&mut host, "SEND");
        unit_says(&mut host, "SEND");
        unit_says(&mut host, "SEND");

        host.poll_once(t);
        assert_eq!(host.poll_once(t).opcode, Opcode::Idle);
        assert_eq!(host.capture_mut().captures, 1);
    }

    #[test]
    fn test_write_failure_does_not_stop_loop() {
        let (mut host, mailbox, t) = host(&[]);
        host.link_mut().uart_mut().fail_writes = true;
        mailbox.post("ALERT CAR");

        let outcome = host.poll_once(t);
        assert!(!outcome.alert_sent);
        assert_eq!(outcome.frames_sent, 0);

        // Alerts are at-most-once: a failed send is not retried
        host.link_mut().uart_mut().fail_writes = false;
        assert!(!host.poll_once(t).alert_sent);
    }

    #[test]
    fn test_recalibrates_when_due() {
        let (mut host, _, t) = host(&[]);
        let later = t + Duration::from_secs(301);

        assert!(!host.poll_once(t + Duration::from_secs(300)).recalibrated);
        assert!(host.poll_once(later).recalibrated);
        assert!(!host.poll_once(later + Duration::from_secs(1)).recalibrated);
        assert_eq!(host.capture_mut().calibrations, 2);
    }
}
