use rand::seq::SliceRandom;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::{Config, StartOrder};
use crate::logging::log;
use crate::roles::{run_consumer, run_producer, CONSUMER, PRODUCER};
use crate::signal::Signal;
use crate::transcript::Transcript;

/// Last line of every successful run
pub const FINISHED: &str = "Producer and consumer have finished.";

/// One of the two threads of the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Consumer,
    Producer,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Consumer => CONSUMER,
            Role::Producer => PRODUCER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Roles in the order their threads were started
    pub started: [Role; 2],
    /// Times the consumer blocked before observing the signal
    pub consumer_waits: usize,
    /// Whether the producer performed the `NotReady -> Ready` transition
    pub producer_transitioned: bool,
}

/// Resolves a [`StartOrder`] into the sequence the threads are spawned in
pub fn start_sequence(order: StartOrder) -> [Role; 2] {
    match order {
        StartOrder::ConsumerFirst => [Role::Consumer, Role::Producer],
        StartOrder::ProducerFirst => [Role::Producer, Role::Consumer],
        StartOrder::Random => {
            let mut roles = [Role::Consumer, Role::Producer];
            roles.shuffle(&mut rand::thread_rng());
            roles
        }
    }
}

/// Runs one handshake: starts both roles, joins both, reports completion
///
/// # Arguments
/// * `config` - Producer delay and start order
/// * `transcript` - Sink for the narrative lines
///
/// # Errors
/// - A thread could not be spawned (OS error kind)
/// - A role thread panicked (`ErrorKind::Other`)
///
/// On either error no thread is left blocked on the signal: the consumer is
/// released and joined before returning.
pub fn run(config: &Config, transcript: Arc<dyn Transcript>) -> io::Result<RunSummary> {
    let signal = Arc::new(Signal::new());
    let started = start_sequence(config.start_order);
    let _ = log(&format!(
        "Starting {} then {} (producer delay {} ms)",
        started[0], started[1], config.producer_delay_ms
    ));

    let mut consumer: Option<JoinHandle<usize>> = None;
    let mut producer: Option<JoinHandle<bool>> = None;

    for role in started {
        let spawned = match role {
            Role::Consumer => {
                let signal = Arc::clone(&signal);
                let transcript = Arc::clone(&transcript);
                spawn_role(role, move || run_consumer(&signal, &*transcript))
                    .map(|h| consumer = Some(h))
            }
            Role::Producer => {
                let signal = Arc::clone(&signal);
                let transcript = Arc::clone(&transcript);
                let delay = config.producer_delay();
                spawn_role(role, move || run_producer(&signal, &*transcript, delay))
                    .map(|h| producer = Some(h))
            }
        };

        if let Err(e) = spawned {
            let _ = log(&format!("Failed to start {} thread: {}", role, e));
            release_and_join(&signal, consumer, producer);
            return Err(e);
        }
    }

    // Both handles are set once the loop finishes without error.
    let (consumer, producer) = match (consumer, producer) {
        (Some(c), Some(p)) => (c, p),
        (consumer, producer) => {
            release_and_join(&signal, consumer, producer);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "handshake threads were not both started",
            ));
        }
    };

    let producer_transitioned = match join_role(producer, Role::Producer) {
        Ok(transitioned) => transitioned,
        Err(e) => {
            let _ = log(&e.to_string());
            release_and_join(&signal, Some(consumer), None);
            return Err(e);
        }
    };
    let consumer_waits = join_role(consumer, Role::Consumer)?;

    transcript.say(FINISHED);
    let _ = log(&format!(
        "Handshake complete: consumer waited {} time(s)",
        consumer_waits
    ));

    Ok(RunSummary {
        started,
        consumer_waits,
        producer_transitioned,
    })
}

/// Spawns a named thread for `role`
fn spawn_role<T, F>(role: Role, body: F) -> io::Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(role.name().to_string())
        .spawn(body)
}

/// Joins a role thread, turning a panic into an error that names the role
fn join_role<T>(handle: JoinHandle<T>, role: Role) -> io::Result<T> {
    handle.join().map_err(|_| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("{} thread panicked", role),
        )
    })
}

/// Sets the signal so a started consumer cannot block forever, then joins
/// whatever was started
fn release_and_join(
    signal: &Signal,
    consumer: Option<JoinHandle<usize>>,
    producer: Option<JoinHandle<bool>>,
) {
    signal.set_ready_and_notify();
    if let Some(handle) = producer {
        let _ = join_role(handle, Role::Producer);
    }
    if let Some(handle) = consumer {
        let _ = join_role(handle, Role::Consumer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{CONSUMER_RECEIVED, CONSUMER_WAITING, PRODUCER_PREPARING, PRODUCER_SENT};
    use crate::transcript::MemoryTranscript;
    use std::sync::Arc;

    fn run_with(start_order: StartOrder, producer_delay_ms: u64) -> (RunSummary, Vec<String>) {
        let transcript = Arc::new(MemoryTranscript::new());
        let config = Config {
            producer_delay_ms,
            start_order,
        };
        let summary = run(&config, transcript.clone()).unwrap();
        (summary, transcript.lines())
    }

    /// Checks the narrative: waiting lines, then the producer, then receipt,
    /// then the finish line.
    fn assert_handshake_order(lines: &[String], consumer_waits: usize) {
        let waiting = lines
            .iter()
            .take_while(|l| l.as_str() == CONSUMER_WAITING)
            .count();
        assert_eq!(waiting, consumer_waits, "transcript: {:?}", lines);
        assert_eq!(
            &lines[waiting..],
            &[PRODUCER_PREPARING, PRODUCER_SENT, CONSUMER_RECEIVED, FINISHED],
            "transcript: {:?}",
            lines
        );
    }

    #[test]
    fn test_start_sequence() {
        assert_eq!(
            start_sequence(StartOrder::ConsumerFirst),
            [Role::Consumer, Role::Producer]
        );
        assert_eq!(
            start_sequence(StartOrder::ProducerFirst),
            [Role::Producer, Role::Consumer]
        );
        let random = start_sequence(StartOrder::Random);
        assert!(random.contains(&Role::Consumer));
        assert!(random.contains(&Role::Producer));
    }

    #[test]
    fn test_run_every_order_without_delay() {
        for order in [
            StartOrder::ConsumerFirst,
            StartOrder::ProducerFirst,
            StartOrder::Random,
        ] {
            for _ in 0..20 {
                let (summary, lines) = run_with(order, 0);
                assert!(summary.producer_transitioned);
                assert_handshake_order(&lines, summary.consumer_waits);
            }
        }
    }

    #[test]
    fn test_run_with_short_delay() {
        let (summary, lines) = run_with(StartOrder::ConsumerFirst, 20);
        assert_eq!(summary.started, [Role::Consumer, Role::Producer]);
        assert!(summary.producer_transitioned);
        assert_handshake_order(&lines, summary.consumer_waits);
        assert_eq!(lines.last().map(String::as_str), Some(FINISHED));
    }

    #[test]
    fn test_join_role_reports_panic() {
        let handle = spawn_role(Role::Producer, || -> bool { panic!("producer failed") }).unwrap();
        let err = join_role(handle, Role::Producer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("producer"));
    }

    #[test]
    fn test_release_and_join_unblocks_consumer() {
        let signal = Arc::new(Signal::new());
        let transcript: Arc<dyn Transcript> = Arc::new(MemoryTranscript::new());
        let consumer = {
            let signal = Arc::clone(&signal);
            spawn_role(Role::Consumer, move || run_consumer(&signal, &*transcript)).unwrap()
        };
        while signal.waiters() == 0 {
            thread::yield_now();
        }

        release_and_join(&signal, Some(consumer), None);
        assert!(signal.is_ready());
        assert_eq!(signal.waiters(), 0);
    }

    #[test]
    fn test_spawned_thread_is_named() {
        let handle = spawn_role(Role::Consumer, || {
            thread::current().name().map(str::to_string)
        })
        .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some(CONSUMER));
    }
}
