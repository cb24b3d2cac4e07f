//! Byte ring tests

use uart_ring_transport::ring::ByteRing;
use uart_ring_transport::TransportError;

#[test]
fn test_ring_empty() {
    let ring: ByteRing<16> = ByteRing::new();
    assert!(ring.is_empty());
    assert!(!ring.has_data());
    assert!(!ring.is_full());
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.pop(), None);
    assert_eq!(ring.peek(), None);
}

#[test]
fn test_ring_push_pop_fifo() {
    let ring: ByteRing<16> = ByteRing::new();

    ring.push(b'a').unwrap();
    ring.push(b'b').unwrap();
    ring.push(b'c').unwrap();

    assert_eq!(ring.len(), 3);
    assert!(ring.has_data());
    assert_eq!(ring.peek(), Some(b'a'));
    assert_eq!(ring.pop(), Some(b'a'));
    assert_eq!(ring.pop(), Some(b'b'));
    assert_eq!(ring.pop(), Some(b'c'));
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_ring_wrap_around() {
    let ring: ByteRing<4> = ByteRing::new();

    for b in 1..=4 {
        ring.push(b).unwrap();
    }
    assert_eq!(ring.pop(), Some(1));
    assert_eq!(ring.pop(), Some(2));

    // Wraps past the end of storage
    ring.push(5).unwrap();
    ring.push(6).unwrap();

    assert_eq!(ring.pop(), Some(3));
    assert_eq!(ring.pop(), Some(4));
    assert_eq!(ring.pop(), Some(5));
    assert_eq!(ring.pop(), Some(6));
    assert!(ring.is_empty());
}

#[test]
fn test_ring_full_rejects_without_mutation() {
    let ring: ByteRing<4> = ByteRing::new();

    for b in 10..14 {
        ring.push(b).unwrap();
    }
    ring.pop();
    ring.push(14).unwrap();
    assert!(ring.is_full());

    let read = ring.read_cursor();
    let write = ring.write_cursor();

    assert_eq!(ring.push(99), Err(TransportError::Overflow));

    assert_eq!(ring.len(), 4);
    assert_eq!(ring.read_cursor(), read);
    assert_eq!(ring.write_cursor(), write);

    // Stored bytes intact, rejected byte absent
    let drained: Vec<u8> = core::iter::from_fn(|| ring.pop()).collect();
    assert_eq!(drained, vec![11, 12, 13, 14]);
}

#[test]
fn test_ring_full_and_empty_exclusive() {
    let ring: ByteRing<8> = ByteRing::new();

    for i in 0..8u8 {
        assert!(!(ring.is_full() && ring.is_empty()));
        assert_eq!(ring.is_full(), ring.len() == 8);
        assert_eq!(ring.is_empty(), ring.len() == 0);
        ring.push(i).unwrap();
    }
    assert!(ring.is_full());
    assert!(!ring.is_empty());
    assert_eq!(ring.available(), 0);
}

#[test]
fn test_ring_almost_full_at_120_of_128() {
    let ring: ByteRing<128> = ByteRing::new();

    for i in 0..119 {
        ring.push(i as u8).unwrap();
    }
    assert!(!ring.is_almost_full());

    ring.push(0).unwrap();
    assert_eq!(ring.len(), 120);
    assert!(ring.is_almost_full());
    assert!(!ring.is_full());
}

#[test]
fn test_ring_almost_full_tracks_occupancy() {
    let ring: ByteRing<128> = ByteRing::new();
    for _ in 0..120 {
        ring.push(0).unwrap();
    }
    assert!(ring.is_almost_full());

    // Falls back below the mark once drained
    ring.pop();
    assert!(!ring.is_almost_full());
}

#[test]
fn test_ring_custom_high_water() {
    let ring: ByteRing<16> = ByteRing::with_high_water(4);
    assert_eq!(ring.high_water(), 4);

    for _ in 0..3 {
        ring.push(0).unwrap();
    }
    assert!(!ring.is_almost_full());
    ring.push(0).unwrap();
    assert!(ring.is_almost_full());
}

#[test]
fn test_ring_capacity() {
    let ring: ByteRing<64> = ByteRing::new();
    assert_eq!(ring.capacity(), 64);
    assert_eq!(ring.available(), 64);

    for i in 0..10 {
        ring.push(i).unwrap();
    }
    assert_eq!(ring.available(), 54);
}

#[test]
fn test_ring_spsc_threads_preserve_order() {
    use std::sync::Arc;
    use std::thread;

    const COUNT: usize = 20_000;

    let ring = Arc::new(ByteRing::<32>::new());

    let producer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            for i in 0..COUNT {
                let byte = (i % 251) as u8;
                while ring.push(byte).is_err() {
                    thread::yield_now();
                }
            }
        })
    };

    let mut received = Vec::with_capacity(COUNT);
    while received.len() < COUNT {
        match ring.pop() {
            Some(b) => received.push(b),
            None => thread::yield_now(),
        }
    }
    producer.join().unwrap();

    let expected: Vec<u8> = (0..COUNT).map(|i| (i % 251) as u8).collect();
    assert_eq!(received, expected);
    assert!(ring.is_empty());
}
