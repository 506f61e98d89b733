//! Passive sound alerts
//!
//! A sound classifier runs outside this process and reports one prediction
//! per audio block. [`AlertPolicy`] decides which predictions become alerts
//! and the [`AlertMailbox`] hands the latest one to the poll loop.

use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::AlertConfig;

/// Single-slot alert hand-off between the feed thread and the poll loop
///
/// Posting replaces an undelivered alert; taking clears the slot under the
/// same lock, so an alert is delivered at most once and never lost to a
/// concurrent post.
#[derive(Debug, Default)]
pub struct AlertMailbox {
    slot: Mutex<Option<String>>,
}

impl AlertMailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an alert, returning the undelivered one it replaced
    pub fn post(&self, text: impl Into<String>) -> Option<String> {
        self.lock().replace(text.into())
    }

    /// Take the pending alert, leaving the slot empty
    pub fn take(&self) -> Option<String> {
        self.lock().take()
    }

    /// Returns true if an alert waits for delivery
    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }
}

/// Alert text for a classifier label, if it is one we announce
pub fn alert_text(label: &str) -> Option<&'static str> {
    match label {
        "siren" => Some("ALERT SIREN"),
        "gun_shot" => Some("ALERT GUN"),
        "car_horn" => Some("ALERT CAR"),
        "dog_bark" => Some("ALERT DOG"),
        "drilling" => Some("ALERT DRILL"),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PredictionError {
    #[error("expected `label confidence volume`, got {0} fields")]
    FieldCount(usize),
    #[error("invalid number `{0}`")]
    Number(String),
}

/// One classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Percent
    pub confidence: f32,
    /// RMS level of the block
    pub volume: f32,
}

impl FromStr for Prediction {
    type Err = PredictionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[label, confidence, volume] = fields.as_slice() else {
            return Err(PredictionError::FieldCount(fields.len()));
        };
        let number = |s: &str| {
            s.parse::<f32>()
                .map_err(|_| PredictionError::Number(s.to_owned()))
        };

        Ok(Self {
            label: label.to_owned(),
            confidence: number(confidence)?,
            volume: number(volume)?,
        })
    }
}

/// Filters predictions into alerts
pub struct AlertPolicy {
    config: AlertConfig,
    /// When a block last got past the volume and cooldown gates
    last_classified: Option<Instant>,
}

impl AlertPolicy {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_classified: None,
        }
    }

    /// Alert text for this prediction, or `None` if it is filtered out
    ///
    /// Quiet blocks are ignored. A loud block starts a cooldown whether or
    /// not it produces an alert; blocks inside the cooldown are ignored.
    pub fn evaluate(&mut self, prediction: &Prediction, now: Instant) -> Option<&'static str> {
        if prediction.volume <= self.config.volume_threshold {
            return None;
        }
        if let Some(last) = self.last_classified {
            if now.saturating_duration_since(last) <= self.config.cooldown() {
                return None;
            }
        }
        self.last_classified = Some(now);

        let text = alert_text(&prediction.label)?;
        (prediction.confidence >= self.config.confidence_threshold).then_some(text)
    }
}

/// Apply the policy to every line of a prediction stream until it ends
///
/// Malformed lines are logged and skipped. Returns the number of alerts
/// posted.
pub fn run_prediction_feed<R: BufRead>(
    reader: R,
    policy: &mut AlertPolicy,
    mailbox: &AlertMailbox,
) -> io::Result<usize> {
    let mut posted = 0;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let prediction = match line.parse::<Prediction>() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%line, "skipping prediction: {e}");
                continue;
            }
        };
        tracing::trace!(
            label = %prediction.label,
            confidence = prediction.confidence,
            volume = prediction.volume,
            "prediction"
        );

        if let Some(text) = policy.evaluate(&prediction, Instant::now()) {
            tracing::info!(label = %prediction.label, confidence = prediction.confidence, "alert raised: {text}");
            if let Some(dropped) = mailbox.post(text) {
                tracing::debug!("replaced undelivered alert `{dropped}`");
            }
            posted += 1;
        }
    }

    Ok(posted)
}

/// Follow a prediction stream (file or named pipe) on a background thread
pub fn spawn_prediction_feed(
    path: PathBuf,
    mut policy: AlertPolicy,
    mailbox: Arc<AlertMailbox>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("prediction-feed".to_owned())
        .spawn(move || {
            let file = match std::fs::File::open(&path) {
                Ok(file) => file,
                Err(e) => {
                    tracing::error!(path = %path.display(), "cannot open prediction feed: {e}");
                    return;
                }
            };

            match run_prediction_feed(BufReader::new(file), &mut policy, &mailbox) {
                Ok(posted) => tracing::info!(posted, "prediction feed ended"),
                Err(e) => tracing::error!("prediction feed failed: {e}"),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn prediction(label: &str, confidence: f32, volume: f32) -> Prediction {
        Prediction {
            label: label.to_owned(),
            confidence,
            volume,
        }
    }

    #[test]
    fn test_mailbox_take_clears() {
        let mailbox = AlertMailbox::new();
        assert_eq!(mailbox.take(), None);
        assert_eq!(mailbox.post("ALERT GUN"), None);
        assert_eq!(mailbox.post("ALERT CAR"), Some("ALERT GUN".to_owned()));
        assert_eq!(mailbox.take(), Some("ALERT CAR".to_owned()));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn test_mailbox_across_threads() {
        let mailbox = Arc::new(AlertMailbox::new());
        let poster = {
            let mailbox = mailbox.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    mailbox.post("ALERT DOG");
                }
            })
        };

        let mut taken = 0;
        while !poster.is_finished() || mailbox.is_pending() {
            if mailbox.take().is_some() {
                taken += 1;
            }
        }
        poster.join().unwrap();

        assert!((1..=100).contains(&taken));
        assert!(!mailbox.is_pending());
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(alert_text("drilling"), Some("ALERT DRILL"));
        assert_eq!(alert_text("gun_shot"), Some("ALERT GUN"));
        assert_eq!(alert_text("street_music"), None);
    }

    #[test]
    fn test_parse_prediction() {
        assert_eq!(
            "siren 87.5 0.2".parse::<Prediction>(),
            Ok(prediction("siren", 87.5, 0.2))
        );
        assert_eq!(
            "siren 87.5".parse::<Prediction>(),
            Err(PredictionError::FieldCount(2))
        );
        assert_eq!(
            "siren high 0.2".parse::<Prediction>(),
            Err(PredictionError::Number("high".to_owned()))
        );
    }

    #[test]
    fn test_policy_thresholds() {
        let t = Instant::now();
        let gap = Duration::from_secs(10);
        let mut policy = AlertPolicy::new(AlertConfig::default());

        // Too quiet
        assert_eq!(policy.evaluate(&prediction("siren", 90.0, 0.05), t), None);
        // Loud but unsure
        assert_eq!(policy.evaluate(&prediction("siren", 19.9, 0.5), t), None);
        // Not a target class
        assert_eq!(policy.evaluate(&prediction("jackhammer", 90.0, 0.5), t + gap), None);
        assert_eq!(
            policy.evaluate(&prediction("car_horn", 20.0, 0.5), t + gap * 2),
            Some("ALERT CAR")
        );
    }

    #[test]
    fn test_policy_cooldown() {
        let t = Instant::now();
        let mut policy = AlertPolicy::new(AlertConfig::default());
        let dog = prediction("dog_bark", 80.0, 0.3);

        assert_eq!(policy.evaluate(&dog, t), Some("ALERT DOG"));
        assert_eq!(policy.evaluate(&dog, t + Duration::from_secs(2)), None);
        assert_eq!(
            policy.evaluate(&dog, t + Duration::from_millis(4001)),
            Some("ALERT DOG")
        );
    }

    #[test]
    fn test_quiet_block_does_not_start_cooldown() {
        let t = Instant::now();
        let mut policy = AlertPolicy::new(AlertConfig::default());

        assert_eq!(policy.evaluate(&prediction("siren", 90.0, 0.01), t), None);
        assert_eq!(
            policy.evaluate(&prediction("siren", 90.0, 0.5), t + Duration::from_millis(10)),
            Some("ALERT SIREN")
        );
    }

    #[test]
    fn test_feed_skips_bad_lines() {
        let input = "garbage\n\nsiren 95 0.4\nsiren 95 0.4\n";
        let mailbox = AlertMailbox::new();
        let mut policy = AlertPolicy::new(AlertConfig::default());

        let posted = run_prediction_feed(Cursor::new(input), &mut policy, &mailbox).unwrap();

        // Second siren falls inside the cooldown
        assert_eq!(posted, 1);
        assert_eq!(mailbox.take(), Some("ALERT SIREN".to_owned()));
    }
}
