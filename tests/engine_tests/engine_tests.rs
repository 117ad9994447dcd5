//! Tests for Engine
//!
//! These tests verify:
//! - Push counts across batches
//! - Pop order for every push/pop pairing
//! - Every integer and string tier survives a round trip
//! - LLEN and DEL bookkeeping
//! - Command execution and request validation
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use packdeque::config::Config;
use packdeque::engine::{Engine, Reply};
use packdeque::protocol::Command;
use packdeque::DequeError;

// =============================================================================
// Helper Functions
// =============================================================================

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_!@#$%^&*()-=+[]\\;':,.<>/?~.|";

fn text(n: usize) -> String {
    (0..n)
        .map(|i| ALPHABET[(i * 13 + n) % ALPHABET.len()] as char)
        .collect()
}

/// One value per tier, away from the boundaries
fn normal_values() -> Vec<String> {
    let mut values = vec![text(10), text(256), text((1 << 13) - 1000)];
    values.extend(
        [
            "28",
            "2024",
            "-2024",
            "15384",
            "-15384",
            "4193301",
            "-4193301",
            "1073731765",
            "-1073731765",
            "4611686018427287903",
            "-4611686018427287903",
        ]
        .map(String::from),
    );
    values
}

/// Values on either side of every tier boundary
fn edge_values() -> Vec<String> {
    let mut values = vec![
        text(1),
        text((1 << 6) - 1),
        text(1 << 6),
        text((1 << 12) - 1),
        text(1 << 12),
    ];
    values.extend(
        [
            "0",
            "127",
            "-4096",
            "4095",
            "-32768",
            "32767",
            "-8388608",
            "8388607",
            "-2147483648",
            "2147483647",
            "-9223372036854775808",
            "9223372036854775807",
        ]
        .map(String::from),
    );
    values
}

fn setup_engine() -> Engine {
    Engine::new(Config::default()).unwrap()
}

fn setup_engine_with_small_nodes() -> Engine {
    let config = Config::builder()
        .node_max_bytes(128) // Forces many node splits
        .node_max_entries(4)
        .build();
    Engine::new(config).unwrap()
}

fn pop_all(engine: &Engine, left: bool) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        let value = if left {
            engine.lpop(b"k").unwrap()
        } else {
            engine.rpop(b"k").unwrap()
        };
        match value {
            Some(v) => out.push(String::from_utf8(v.to_vec()).unwrap()),
            None => return out,
        }
    }
}

fn reversed(values: &[String]) -> Vec<String> {
    values.iter().rev().cloned().collect()
}

// =============================================================================
// Push Tests
// =============================================================================

#[test]
fn test_lpush_counts() {
    let engine = setup_engine();

    assert_eq!(engine.lpush(b"k", &["v"]).unwrap(), 1);
    assert_eq!(engine.lpush(b"k", &["v1", "1", "v2", "2"]).unwrap(), 5);
    assert_eq!(engine.lpush(b"k", &["3", "3", "3", "v3", "v3", "v3"]).unwrap(), 11);
    assert_eq!(engine.lpush(b"k", &normal_values()).unwrap(), 25);
    assert_eq!(engine.lpush(b"k", &edge_values()).unwrap(), 42);
}

#[test]
fn test_rpush_counts() {
    let engine = setup_engine();

    assert_eq!(engine.rpush(b"k", &["v"]).unwrap(), 1);
    assert_eq!(engine.rpush(b"k", &["v1", "1", "v2", "2"]).unwrap(), 5);
    assert_eq!(engine.rpush(b"k", &["3", "3", "3", "v3", "v3", "v3"]).unwrap(), 11);
    assert_eq!(engine.rpush(b"k", &normal_values()).unwrap(), 25);
    assert_eq!(engine.rpush(b"k", &edge_values()).unwrap(), 42);
}

#[test]
fn test_push_requires_values() {
    let engine = setup_engine();
    let empty: [&str; 0] = [];

    let err = engine.lpush(b"k", &empty).unwrap_err();
    assert!(matches!(err, DequeError::Protocol(_)));
    assert!(err.to_string().contains("LPUSH requires at least one value"));

    let err = engine.rpush(b"k", &empty).unwrap_err();
    assert!(err.to_string().contains("RPUSH"));

    assert_eq!(engine.llen(b"k"), 0);
    assert!(engine.keyspace().is_empty());
}

// =============================================================================
// Push/Pop Order Tests
// =============================================================================

#[test]
fn test_lpush_lpop() {
    let engine = setup_engine();

    assert_eq!(engine.lpush(b"k", &["v1", "1"]).unwrap(), 2);
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "1");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "v1");
    assert_eq!(engine.lpop(b"k").unwrap(), None);

    for values in [normal_values(), edge_values()] {
        engine.lpush(b"k", &values).unwrap();
        assert_eq!(pop_all(&engine, true), reversed(&values));
    }
}

#[test]
fn test_lpush_rpop() {
    let engine = setup_engine();

    engine.lpush(b"k", &["v1", "1"]).unwrap();
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "v1");
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "1");
    assert_eq!(engine.rpop(b"k").unwrap(), None);

    for values in [normal_values(), edge_values()] {
        engine.lpush(b"k", &values).unwrap();
        assert_eq!(pop_all(&engine, false), values);
    }
}

#[test]
fn test_rpush_lpop() {
    let engine = setup_engine();

    engine.rpush(b"k", &["v1", "1"]).unwrap();
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "v1");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "1");
    assert_eq!(engine.lpop(b"k").unwrap(), None);

    for values in [normal_values(), edge_values()] {
        engine.rpush(b"k", &values).unwrap();
        assert_eq!(pop_all(&engine, true), values);
    }
}

#[test]
fn test_rpush_rpop() {
    let engine = setup_engine();

    engine.rpush(b"k", &["v1", "1"]).unwrap();
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "1");
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "v1");
    assert_eq!(engine.rpop(b"k").unwrap(), None);

    for values in [normal_values(), edge_values()] {
        engine.rpush(b"k", &values).unwrap();
        assert_eq!(pop_all(&engine, false), reversed(&values));
    }
}

#[test]
fn test_order_survives_node_splits() {
    let engine = setup_engine_with_small_nodes();
    let mut values = normal_values();
    values.extend(edge_values());

    engine.rpush(b"k", &values).unwrap();
    assert!(engine.keyspace().with_deque(b"k", |d| d.node_count()).unwrap() > 1);
    assert_eq!(pop_all(&engine, true), values);

    engine.lpush(b"k", &values).unwrap();
    assert_eq!(pop_all(&engine, true), reversed(&values));
}

#[test]
fn test_mixed_ends() {
    let engine = setup_engine();

    assert_eq!(engine.rpush(b"k", &["v1000", "1000"]).unwrap(), 2);
    assert_eq!(engine.lpush(b"k", &["v2000", "2000"]).unwrap(), 4);

    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "1000");
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "v1000");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "2000");

    assert_eq!(engine.lpush(b"k", &["v6"]).unwrap(), 2);

    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "v2000");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "v6");
    assert_eq!(engine.lpop(b"k").unwrap(), None);
    assert_eq!(engine.rpop(b"k").unwrap(), None);
}

#[test]
fn test_batch_lpush_pops_in_reverse() {
    let engine = setup_engine();

    assert_eq!(engine.lpush(b"k", &["v1", "1", "v2", "2"]).unwrap(), 4);

    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "2");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "v2");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "1");
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "v1");
    assert_eq!(engine.lpop(b"k").unwrap(), None);
}

#[test]
fn test_push_pop_llen_session() {
    let engine = setup_engine();

    assert_eq!(engine.lpush(b"k", &["v"]).unwrap(), 1);
    assert_eq!(engine.lpush(b"k", &["v1", "1", "v2", "2"]).unwrap(), 5);
    assert_eq!(engine.lpop(b"k").unwrap().unwrap(), "2");
    assert_eq!(engine.rpop(b"k").unwrap().unwrap(), "v");
    assert_eq!(engine.llen(b"k"), 3);

    // The same session through the command dispatcher
    let engine = setup_engine();
    let push = |values: &[&str]| Command::LPush {
        key: b"k".to_vec(),
        values: values.iter().map(|v| Bytes::copy_from_slice(v.as_bytes())).collect(),
    };
    let key = || b"k".to_vec();

    assert_eq!(engine.execute(push(&["v"])).unwrap(), Reply::Integer(1));
    assert_eq!(
        engine.execute(push(&["v1", "1", "v2", "2"])).unwrap(),
        Reply::Integer(5)
    );
    assert_eq!(
        engine.execute(Command::LPop { key: key() }).unwrap(),
        Reply::Value(Bytes::from("2"))
    );
    assert_eq!(
        engine.execute(Command::RPop { key: key() }).unwrap(),
        Reply::Value(Bytes::from("v"))
    );
    assert_eq!(
        engine.execute(Command::LLen { key: key() }).unwrap(),
        Reply::Integer(3)
    );
}

#[test]
fn test_integer_strings_come_back_verbatim() {
    let engine = setup_engine();
    let values = ["1", "5", "2", "v", "3", "007", "+7", "-0", ""];

    engine.rpush(b"k", &values).unwrap();
    for value in values {
        assert_eq!(engine.lpop(b"k").unwrap().unwrap(), value);
    }
}

// =============================================================================
// LLEN / DEL Tests
// =============================================================================

#[test]
fn test_llen_tracks_pushes_and_pops() {
    let engine = setup_engine();

    engine.rpush(b"k", &["v1000", "1000"]).unwrap();
    engine.lpush(b"k", &["v2000", "2000"]).unwrap();
    assert_eq!(engine.llen(b"k"), 4);

    engine.rpop(b"k").unwrap();
    assert_eq!(engine.llen(b"k"), 3);
    engine.rpop(b"k").unwrap();
    engine.lpop(b"k").unwrap();
    assert_eq!(engine.llen(b"k"), 1);

    engine.lpush(b"k", &["v6"]).unwrap();
    assert_eq!(engine.llen(b"k"), 2);

    engine.rpop(b"k").unwrap();
    assert_eq!(engine.llen(b"k"), 1);
    engine.lpop(b"k").unwrap();
    engine.lpop(b"k").unwrap();
    engine.rpop(b"k").unwrap();
    assert_eq!(engine.llen(b"k"), 0);
}

#[test]
fn test_llen_missing_key() {
    let engine = setup_engine();
    assert_eq!(engine.llen(b"nonexistent"), 0);
}

#[test]
fn test_del() {
    let engine = setup_engine();

    engine.rpush(b"k", &edge_values()).unwrap();
    assert!(engine.del(b"k"));
    assert_eq!(engine.llen(b"k"), 0);
    assert_eq!(engine.lpop(b"k").unwrap(), None);
    assert!(!engine.del(b"k"));

    assert_eq!(engine.rpush(b"k", &["fresh"]).unwrap(), 1);
}

#[test]
fn test_drained_key_disappears() {
    let engine = setup_engine();

    engine.lpush(b"k", &["a"]).unwrap();
    engine.rpop(b"k").unwrap();

    assert!(!engine.keyspace().contains(b"k"));
    assert!(!engine.del(b"k"));
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_commands() {
    let engine = setup_engine();

    let reply = engine
        .execute(Command::RPush {
            key: b"k".to_vec(),
            values: vec![Bytes::from("a"), Bytes::from("42")],
        })
        .unwrap();
    assert_eq!(reply, Reply::Integer(2));

    let reply = engine
        .execute(Command::LPush {
            key: b"k".to_vec(),
            values: vec![Bytes::from("z")],
        })
        .unwrap();
    assert_eq!(reply, Reply::Integer(3));

    let reply = engine.execute(Command::LLen { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Integer(3));

    let reply = engine.execute(Command::RPop { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Value(Bytes::from("42")));

    let reply = engine.execute(Command::LPop { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Value(Bytes::from("z")));

    let reply = engine.execute(Command::Del { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Integer(1));

    let reply = engine.execute(Command::Del { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Integer(0));

    let reply = engine.execute(Command::LPop { key: b"k".to_vec() }).unwrap();
    assert_eq!(reply, Reply::Nil);

    let reply = engine.execute(Command::Ping).unwrap();
    assert_eq!(reply, Reply::Pong);
}

#[test]
fn test_execute_rejects_empty_push() {
    let engine = setup_engine();

    let result = engine.execute(Command::LPush {
        key: b"k".to_vec(),
        values: vec![],
    });
    assert!(matches!(result, Err(DequeError::Protocol(_))));
    assert_eq!(engine.llen(b"k"), 0);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_engine_rejects_invalid_config() {
    let config = Config::builder().node_max_entries(0).build();
    assert!(matches!(Engine::new(config), Err(DequeError::Config(_))));

    let config = Config::builder().keyspace_shards(0).build();
    assert!(matches!(Engine::new(config), Err(DequeError::Config(_))));
}

#[test]
fn test_engine_uses_configured_limits() {
    let engine = setup_engine_with_small_nodes();

    assert_eq!(engine.config().node_limits.max_entries, 4);
    engine.rpush(b"k", &["1", "2", "3", "4", "5"]).unwrap();
    assert_eq!(engine.keyspace().with_deque(b"k", |d| d.node_count()), Some(2));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_pushes() {
    let engine = Arc::new(setup_engine_with_small_nodes());
    let mut handles = vec![];

    for t in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                let value = format!("t{}-{}", t, i);
                engine.rpush(b"k", &[value]).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.llen(b"k"), 1000);
}

#[test]
fn test_concurrent_pops_return_each_value_once() {
    let engine = Arc::new(setup_engine());
    let values: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    engine.rpush(b"k", &values).unwrap();

    let mut handles = vec![];
    for t in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let mut popped = Vec::new();
            loop {
                let value = if t % 2 == 0 {
                    engine.lpop(b"k").unwrap()
                } else {
                    engine.rpop(b"k").unwrap()
                };
                match value {
                    Some(v) => popped.push(String::from_utf8(v.to_vec()).unwrap()),
                    None => return popped,
                }
            }
        }));
    }

    let mut all: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all.sort_by_key(|v| v.parse::<u32>().unwrap());

    assert_eq!(all, values);
    assert!(engine.keyspace().is_empty());
}
