//! Deque Tests
//!
//! Tests verify:
//! - Ordering at both ends (LIFO / FIFO pairs)
//! - Batch push semantics
//! - Mixed integer and string elements
//! - Node split and release under small limits
//! - Count and byte-size bookkeeping

use packdeque::codec::Record;
use packdeque::{Deque, NodeLimits};

// =============================================================================
// Helper Functions
// =============================================================================

fn drain_left(deque: &mut Deque) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(value) = deque.pop_left().unwrap() {
        out.push(value.to_vec());
    }
    out
}

fn contents(deque: &Deque) -> Vec<Vec<u8>> {
    deque.iter().map(|v| v.unwrap().to_vec()).collect()
}

fn node_lens(deque: &Deque) -> Vec<usize> {
    deque.nodes().map(|node| node.len()).collect()
}

fn small() -> NodeLimits {
    NodeLimits::new(8192, 4)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_deque_is_empty() {
    let mut deque = Deque::new();

    assert_eq!(deque.len(), 0);
    assert_eq!(deque.byte_size(), 0);
    assert_eq!(deque.node_count(), 0);
    assert!(deque.is_empty());
    assert_eq!(deque.pop_left().unwrap(), None);
    assert_eq!(deque.pop_right().unwrap(), None);
    assert_eq!(deque.limits(), NodeLimits::default());
}

#[test]
fn test_push_left_pop_left_reverses() {
    let mut deque = Deque::new();

    assert_eq!(deque.push_left(["v1", "v2", "v3"]).unwrap(), 3);
    assert_eq!(drain_left(&mut deque), vec![b"v3".to_vec(), b"v2".to_vec(), b"v1".to_vec()]);
}

#[test]
fn test_push_right_pop_left_preserves_order() {
    let mut deque = Deque::new();

    deque.push_right(["v1", "v2", "v3"]).unwrap();
    assert_eq!(drain_left(&mut deque), vec![b"v1".to_vec(), b"v2".to_vec(), b"v3".to_vec()]);
}

#[test]
fn test_push_left_pop_right_preserves_order() {
    let mut deque = Deque::new();

    deque.push_left(["v1", "v2", "v3"]).unwrap();
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v1");
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v2");
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v3");
    assert_eq!(deque.pop_right().unwrap(), None);
}

#[test]
fn test_push_right_pop_right_reverses() {
    let mut deque = Deque::new();

    deque.push_right(["v1", "v2", "v3"]).unwrap();
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v3");
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v2");
    assert_eq!(deque.pop_right().unwrap().unwrap(), "v1");
}

#[test]
fn test_interleaved_ends() {
    let mut deque = Deque::new();

    deque.push_left(["a"]).unwrap();
    deque.push_right(["b"]).unwrap();
    deque.push_left(["c"]).unwrap();
    assert_eq!(contents(&deque), vec![b"c".to_vec(), b"a".to_vec(), b"b".to_vec()]);

    assert_eq!(deque.pop_right().unwrap().unwrap(), "b");
    assert_eq!(deque.pop_left().unwrap().unwrap(), "c");
    assert_eq!(deque.pop_left().unwrap().unwrap(), "a");
    assert!(deque.is_empty());
}

#[test]
fn test_integer_like_and_plain_strings_keep_push_order() {
    let mut deque = Deque::new();

    deque.push_right(["1", "5", "2", "v", "3"]).unwrap();
    assert_eq!(deque.len(), 5);

    let expected: Vec<&[u8]> = vec![b"1", b"5", b"2", b"v", b"3"];
    for value in expected {
        assert_eq!(deque.pop_left().unwrap().unwrap(), value);
    }
    assert_eq!(deque.pop_left().unwrap(), None);
}

#[test]
fn test_values_come_back_byte_identical() {
    let mut deque = Deque::new();
    let inputs: Vec<Vec<u8>> = vec![
        b"007".to_vec(),
        b"+5".to_vec(),
        b"-0".to_vec(),
        b"".to_vec(),
        b"-9223372036854775808".to_vec(),
        b"9223372036854775808".to_vec(),
        vec![0xff, 0x00, 0x80],
        vec![b'w'; 5000],
    ];

    deque.push_right(&inputs).unwrap();
    assert_eq!(drain_left(&mut deque), inputs);
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_batch_push_matches_single_pushes() {
    let mut batched = Deque::with_limits(small());
    let mut single = Deque::with_limits(small());

    batched.push_left(["a", "b", "c", "d", "e", "f"]).unwrap();
    for value in ["a", "b", "c", "d", "e", "f"] {
        single.push_left([value]).unwrap();
    }

    assert_eq!(contents(&batched), contents(&single));
    assert_eq!(batched.byte_size(), single.byte_size());
}

#[test]
fn test_push_returns_running_length() {
    let mut deque = Deque::new();

    assert_eq!(deque.push_right(["1"]).unwrap(), 1);
    assert_eq!(deque.push_left(["2", "3", "4", "5"]).unwrap(), 5);
    assert_eq!(deque.push_right(["v"; 6]).unwrap(), 11);
}

#[test]
fn test_empty_batch_is_noop() {
    let mut deque = Deque::new();

    assert_eq!(deque.push_right(Vec::<&[u8]>::new()).unwrap(), 0);
    assert_eq!(deque.node_count(), 0);
}

// =============================================================================
// Node Management Tests
// =============================================================================

#[test]
fn test_push_right_splits_at_tail() {
    let mut deque = Deque::with_limits(small());
    let values: Vec<String> = (0..10).map(|i| format!("v{}", i)).collect();

    deque.push_right(&values).unwrap();

    assert_eq!(deque.node_count(), 3);
    assert_eq!(node_lens(&deque), vec![4, 4, 2]);
    assert_eq!(
        contents(&deque),
        values.iter().map(|v| v.as_bytes().to_vec()).collect::<Vec<_>>()
    );
}

#[test]
fn test_push_left_splits_at_head() {
    let mut deque = Deque::with_limits(small());
    let values: Vec<String> = (0..10).map(|i| format!("v{}", i)).collect();

    deque.push_left(&values).unwrap();

    assert_eq!(node_lens(&deque), vec![2, 4, 4]);
    let mut reversed: Vec<Vec<u8>> = values.iter().map(|v| v.as_bytes().to_vec()).collect();
    reversed.reverse();
    assert_eq!(contents(&deque), reversed);
}

#[test]
fn test_split_on_byte_limit() {
    // "abc" encodes to 5 bytes: three per node
    let mut deque = Deque::with_limits(NodeLimits::new(16, 100));

    deque.push_right(["abc"; 7]).unwrap();
    assert_eq!(node_lens(&deque), vec![3, 3, 1]);
    assert_eq!(deque.byte_size(), 35);
}

#[test]
fn test_oversized_element_gets_own_node() {
    let mut deque = Deque::with_limits(NodeLimits::new(64, 100));
    let big = vec![b'B'; 500];

    deque.push_right(["a"]).unwrap();
    deque.push_right([big.as_slice()]).unwrap();
    deque.push_right(["z"]).unwrap();

    assert_eq!(node_lens(&deque), vec![1, 1, 1]);
    assert_eq!(contents(&deque), vec![b"a".to_vec(), big, b"z".to_vec()]);
}

#[test]
fn test_emptied_nodes_are_released() {
    let mut deque = Deque::with_limits(small());
    deque.push_right((0..10).map(|i| i.to_string())).unwrap();
    assert_eq!(deque.node_count(), 3);

    for _ in 0..4 {
        deque.pop_left().unwrap();
    }
    assert_eq!(deque.node_count(), 2);

    for _ in 0..2 {
        deque.pop_right().unwrap();
    }
    assert_eq!(deque.node_count(), 1);

    for _ in 0..4 {
        deque.pop_left().unwrap();
    }
    assert_eq!(deque.node_count(), 0);
    assert_eq!(deque.byte_size(), 0);
}

#[test]
fn test_released_slots_are_reused() {
    let mut deque = Deque::with_limits(NodeLimits::new(8192, 2));

    // Keep a node alive in the middle while churning the ends
    deque.push_right(["m1", "m2"]).unwrap();
    for round in 0..50 {
        let value = round.to_string();
        deque.push_left([value.as_str(), value.as_str(), value.as_str()]).unwrap();
        deque.push_right([value.as_str(), value.as_str(), value.as_str()]).unwrap();
        for _ in 0..3 {
            assert_eq!(deque.pop_left().unwrap().unwrap(), value);
            assert_eq!(deque.pop_right().unwrap().unwrap(), value);
        }
    }

    assert_eq!(contents(&deque), vec![b"m1".to_vec(), b"m2".to_vec()]);
    assert_eq!(deque.node_count(), 1);
}

#[test]
fn test_deque_reusable_after_drain() {
    let mut deque = Deque::with_limits(small());

    deque.push_left(["a", "b", "c", "d", "e"]).unwrap();
    drain_left(&mut deque);
    assert_eq!(deque.node_count(), 0);

    deque.push_right(["x", "y"]).unwrap();
    assert_eq!(contents(&deque), vec![b"x".to_vec(), b"y".to_vec()]);
    assert_eq!(deque.node_count(), 1);
}

// =============================================================================
// Bookkeeping Tests
// =============================================================================

#[test]
fn test_len_and_byte_size_match_nodes() {
    let mut deque = Deque::with_limits(NodeLimits::new(48, 5));

    for i in 0..40 {
        let value = if i % 3 == 0 {
            (i * 1000).to_string()
        } else {
            "s".repeat(i)
        };
        if i % 2 == 0 {
            deque.push_left([value]).unwrap();
        } else {
            deque.push_right([value]).unwrap();
        }

        let node_len: usize = deque.nodes().map(|n| n.len()).sum();
        let node_bytes: usize = deque.nodes().map(|n| n.byte_size()).sum();
        assert_eq!(deque.len(), node_len);
        assert_eq!(deque.byte_size(), node_bytes);
        assert!(deque.nodes().all(|n| !n.is_empty()));
    }

    let encoded: usize = contents(&deque)
        .iter()
        .map(|v| Record::encode(v).unwrap().encoded_len())
        .sum();
    assert_eq!(deque.byte_size(), encoded);
}

#[test]
fn test_debug_reports_counts() {
    let mut deque = Deque::new();
    deque.push_right(["1", "2"]).unwrap();

    let debug = format!("{:?}", deque);
    assert!(debug.contains("len: 2"));
    assert!(debug.contains("node_count: 1"));
}
