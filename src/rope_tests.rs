use super::*;

#[test]
fn s1_rope_round_trip() {
    let r = Rope::new(b"This is a rope.");
    let r = r.insert(15, b" | Appended.");
    let r = r.insert(8, b"| Inserted | ");
    assert_eq!(
        r.to_bytes(),
        b"This is | Inserted | a rope. | Appended.".to_vec()
    );
}

#[test]
fn invariant_insert_matches_slice_concatenation() {
    let original = b"hello world";
    let r = Rope::new(original);
    for i in 0..=original.len() {
        let inserted = r.insert(i, b"XYZ");
        let mut expected = original[..i].to_vec();
        expected.extend_from_slice(b"XYZ");
        expected.extend_from_slice(&original[i..]);
        assert_eq!(inserted.to_bytes(), expected, "insert at {i}");
    }
}

#[test]
fn invariant_remove_span_matches_slice_removal() {
    let original = b"hello world, how are you";
    let r = Rope::new(original);
    for offset in 0..original.len() {
        for count in 0..(original.len() - offset) {
            let removed = r.remove_span(offset, count);
            let mut expected = original[..offset].to_vec();
            expected.extend_from_slice(&original[offset + count..]);
            assert_eq!(removed.to_bytes(), expected, "offset={offset} count={count}");
        }
    }
}

#[test]
fn invariant_length_matches_byte_length() {
    let r = Rope::new(b"abc").insert(1, b"XYZ").remove_span(0, 2);
    assert_eq!(r.len(), r.to_bytes().len());
}

#[test]
fn remove_span_zero_count_is_noop() {
    let r = Rope::new(b"abcdef");
    let same = r.remove_span(2, 0);
    assert_eq!(same.to_bytes(), r.to_bytes());
}

#[test]
fn index_out_of_range_returns_zero_byte() {
    let r = Rope::new(b"abc");
    assert_eq!(r.byte_at(2), b'c');
    assert_eq!(r.byte_at(3), 0);
    assert_eq!(r.byte_at(1000), 0);
}

#[test]
fn empty_rope_has_zero_length() {
    let r = Rope::empty();
    assert_eq!(r.len(), 0);
    assert!(r.is_empty());
    assert_eq!(r.to_bytes(), Vec::<u8>::new());
}

#[test]
fn insert_empty_string_is_noop() {
    let r = Rope::new(b"abc");
    let r2 = r.insert(1, b"");
    assert_eq!(r2.to_bytes(), r.to_bytes());
}

#[test]
fn edits_do_not_mutate_the_original_rope() {
    let original = Rope::new(b"hello");
    let edited = original.insert(0, b"XX");
    assert_eq!(original.to_bytes(), b"hello");
    assert_eq!(edited.to_bytes(), b"XXhello");
}

#[test]
fn deeply_nested_inserts_do_not_overflow_the_call_stack() {
    let mut r = Rope::new(b"");
    for _ in 0..2000 {
        r = r.insert(0, b"a");
    }
    assert_eq!(r.len(), 2000);
    assert_eq!(r.to_bytes().len(), 2000);
}
