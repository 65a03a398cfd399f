use std::thread;
use std::time::Duration;

use crate::logging::log_with_role;
use crate::signal::Signal;
use crate::transcript::Transcript;

pub const CONSUMER_WAITING: &str = "Consumer: Waiting for message...";
pub const CONSUMER_RECEIVED: &str = "Consumer: Message received!";
pub const PRODUCER_PREPARING: &str = "Producer: Preparing message...";
pub const PRODUCER_SENT: &str = "Producer: Message sent!";

pub const CONSUMER: &str = "consumer";
pub const PRODUCER: &str = "producer";

/// Waits for the signal and reports receipt
///
/// Every narrative line is written while the signal's lock is held, so
/// "received" can only follow the producer's lines.
///
/// # Returns
/// Number of times the consumer blocked
pub fn run_consumer(signal: &Signal, transcript: &dyn Transcript) -> usize {
    let _ = log_with_role("Started, waiting for the signal", Some(CONSUMER));

    let waits = signal.wait_until_ready_with(
        || transcript.say(CONSUMER_WAITING),
        || transcript.say(CONSUMER_RECEIVED),
    );

    let _ = log_with_role(&format!("Signal observed after {} wait(s)", waits), Some(CONSUMER));
    waits
}

/// Sleeps for `delay`, then sets the signal and wakes the consumer
///
/// The delay only makes the demo output read in the classic order; the
/// handshake is correct for any delay, zero included.
///
/// # Returns
/// `true` if this call performed the `NotReady -> Ready` transition
pub fn run_producer(signal: &Signal, transcript: &dyn Transcript, delay: Duration) -> bool {
    let _ = log_with_role(&format!("Started, sleeping {} ms", delay.as_millis()), Some(PRODUCER));
    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let transitioned = signal.set_ready_and_notify_with(
        || transcript.say(PRODUCER_PREPARING),
        || transcript.say(PRODUCER_SENT),
    );

    let _ = log_with_role(
        if transitioned {
            "Signal set and waiter notified"
        } else {
            "Signal was already set, notified again"
        },
        Some(PRODUCER),
    );
    transitioned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::MemoryTranscript;
    use std::sync::Arc;

    #[test]
    fn test_consumer_after_producer_does_not_wait() {
        let signal = Signal::new();
        let transcript = MemoryTranscript::new();

        assert!(run_producer(&signal, &transcript, Duration::ZERO));
        assert_eq!(run_consumer(&signal, &transcript), 0);
        assert_eq!(
            transcript.lines(),
            vec![PRODUCER_PREPARING, PRODUCER_SENT, CONSUMER_RECEIVED]
        );
    }

    #[test]
    fn test_consumer_blocked_before_producer_runs() {
        let signal = Arc::new(Signal::new());
        let transcript = Arc::new(MemoryTranscript::new());

        let consumer = {
            let signal = Arc::clone(&signal);
            let transcript = Arc::clone(&transcript);
            thread::spawn(move || run_consumer(&signal, &*transcript))
        };

        while signal.waiters() == 0 {
            thread::yield_now();
        }
        assert!(run_producer(&signal, &*transcript, Duration::ZERO));
        let waits = consumer.join().unwrap();

        // One block, plus at most a handful of OS-level spurious wake-ups.
        assert!((1..=3).contains(&waits));
        let lines = transcript.lines();
        let waiting = lines.iter().filter(|l| *l == CONSUMER_WAITING).count();
        assert_eq!(waiting, waits);
        assert_eq!(
            &lines[waiting..],
            &[PRODUCER_PREPARING, PRODUCER_SENT, CONSUMER_RECEIVED]
        );
    }

    #[test]
    fn test_second_producer_does_not_transition() {
        let signal = Signal::new();
        let transcript = MemoryTranscript::new();

        assert!(run_producer(&signal, &transcript, Duration::ZERO));
        assert!(!run_producer(&signal, &transcript, Duration::ZERO));
        assert!(signal.is_ready());
        assert_eq!(run_consumer(&signal, &transcript), 0);
    }
}
