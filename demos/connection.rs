//! Connection Lifecycle
//!
//! This example drives a small client connection through its lifecycle.
//!
//! Key concepts:
//! - Numbered state tables declared with `state_numbers!`
//! - Bootstrap from the init state into the first real state
//! - Hooks attached and released at runtime
//! - Deferring a close request while paused
//! - Disposal through the free state
//!
//! Run with: RUST_LOG=statewire=trace cargo run --example connection

use statewire::builder::MachineDefinitionBuilder;
use statewire::core::{HookPhase, HookPoint, HookScope, StateNumber};
use statewire::engine::{Engine, Machine, ProcessResult};
use statewire::state_numbers;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

state_numbers! {
    mod conn {
        INIT = 1,
        RESOLVING = 2,
        CONNECTING = 3,
        OPEN = 4,
        CLOSING = 5,
        FREE = 6,
    }
}

#[derive(Debug, Default)]
struct Connection {
    host: &'static str,
    attempts: u32,
    bytes_sent: usize,
    queued: Vec<&'static str>,
}

fn start(_: &mut Engine<Connection>, _: &mut Connection) -> StateNumber {
    conn::RESOLVING
}

fn resolved(_: &mut Engine<Connection>, connection: &mut Connection) -> StateNumber {
    println!("  resolved {}", connection.host);
    conn::CONNECTING
}

fn dial(_: &mut Engine<Connection>, connection: &mut Connection) {
    connection.attempts += 1;
    println!("  dialing {} (attempt {})", connection.host, connection.attempts);
}

fn connected(_: &mut Engine<Connection>, connection: &mut Connection) -> StateNumber {
    if connection.attempts < 2 {
        println!("  connect refused, retrying");
        return conn::RESOLVING;
    }
    conn::OPEN
}

fn flush(_: &mut Engine<Connection>, connection: &mut Connection) -> StateNumber {
    for message in connection.queued.drain(..) {
        connection.bytes_sent += message.len();
        println!("  sent {message:?}");
    }
    0
}

fn closing(_: &mut Engine<Connection>, _: &mut Connection) {
    println!("  sending goodbye");
}

fn release(_: &mut Engine<Connection>, connection: &mut Connection) {
    println!(
        "  released connection to {} after {} bytes",
        connection.host, connection.bytes_sent
    );
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Connection Lifecycle ===\n");

    let definition = MachineDefinitionBuilder::<Connection>::new()
        .state(conn::INIT, "Init")
        .state(conn::RESOLVING, "Resolving")
        .state(conn::CONNECTING, "Connecting")
        .state(conn::OPEN, "Open")
        .state(conn::CLOSING, "Closing")
        .state(conn::FREE, "Free")
        .on_process(conn::INIT, start)
        .on_process(conn::RESOLVING, resolved)
        .on_enter(conn::CONNECTING, dial)
        .on_process(conn::CONNECTING, connected)
        .on_process(conn::OPEN, flush)
        .on_enter(conn::CLOSING, closing)
        .on_enter(conn::FREE, release)
        .init(conn::INIT)
        .free(conn::FREE)
        .history_limit(32)
        .build()
        .unwrap();

    let connection = Connection {
        host: "db.internal:5432",
        ..Connection::default()
    };
    let mut machine = Machine::create(Arc::new(definition), connection);
    println!("Created in state {}\n", machine.state_name(0));

    let mut scope = HookScope::new();
    for &state in conn::ALL {
        if state == conn::INIT {
            continue;
        }
        let handle = machine
            .register(state, HookPoint::Enter, HookPhase::Post, false, |engine, event| {
                println!(
                    "  [hook] {} -> {}",
                    engine.state_name(event.from),
                    engine.state_name(event.to)
                );
            })
            .unwrap();
        scope.track(handle);
    }
    machine
        .register(conn::OPEN, HookPoint::Enter, HookPhase::Pre, true, |_, _| {
            println!("  [hook] first time open");
        })
        .unwrap();

    println!("Driving the connection until it opens:");
    while machine.current_state() != conn::OPEN {
        match machine.process() {
            ProcessResult::NoChange => break,
            ProcessResult::Transitioned(_) => {}
            ProcessResult::Fatal => {
                println!("  connection gave up");
                return;
            }
        }
    }

    println!("\nFlushing writes:");
    machine.context_mut().queued.extend(["HELLO", "QUERY 1"]);
    let _ = machine.process();

    println!("\nClosing while paused:");
    machine.pause();
    machine.transition(conn::CLOSING).unwrap();
    println!(
        "  close requested, deferred to {:?}",
        machine.deferred_state().map(|state| machine.state_name(state))
    );
    machine.resume();

    println!("\nReleasing hooks: {} removed", machine.release_scope(&mut scope));

    println!("\nPath taken:");
    let path: Vec<_> = machine
        .history()
        .get_path()
        .into_iter()
        .map(|state| machine.state_name(state))
        .collect();
    println!("  {}", path.join(" -> "));

    println!("\nDisposing:");
    machine.dispose();

    println!("\n=== Example Complete ===");
}
