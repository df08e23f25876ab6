//! Property tests for a single channel driven from one thread.
//!
//! Random sequences of non-blocking reads and writes are checked against a
//! `VecDeque` model: transfer counts, returned bytes, and the capacity bound.

use std::collections::VecDeque;

use proptest::prelude::*;

use super::Mode;
use crate::{ChannelTable, FifoError};

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..24).prop_map(Op::Write),
        (0usize..24).prop_map(Op::Read),
    ]
}

proptest! {
    #[test]
    fn matches_fifo_model(capacity in 1usize..32, ops in prop::collection::vec(arb_op(), 1..64)) {
        let table = ChannelTable::create(1, capacity).unwrap();
        let h = table.open(0).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(data) => {
                    let room = capacity - model.len();
                    let res = h.write(&data, Mode::NonBlocking);
                    if room == 0 {
                        prop_assert_eq!(res, Err(FifoError::WouldBlock));
                    } else {
                        let n = data.len().min(room);
                        prop_assert_eq!(res, Ok(n));
                        model.extend(&data[..n]);
                    }
                }
                Op::Read(len) => {
                    let mut out = vec![0u8; len];
                    let res = h.read(&mut out, Mode::NonBlocking);
                    if model.is_empty() {
                        prop_assert_eq!(res, Err(FifoError::WouldBlock));
                    } else {
                        let n = len.min(model.len());
                        prop_assert_eq!(res, Ok(n));
                        let expected: Vec<u8> = model.drain(..n).collect();
                        prop_assert_eq!(&out[..n], expected.as_slice());
                    }
                }
            }
            prop_assert!(h.channel().len() <= capacity);
            prop_assert_eq!(h.channel().len(), model.len());
        }
    }

    #[test]
    fn chunked_writes_read_back_in_order(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..16), 1..8)) {
        let total: usize = chunks.iter().map(Vec::len).sum();
        let table = ChannelTable::create(1, total).unwrap();
        let h = table.open(0).unwrap();

        for chunk in &chunks {
            prop_assert_eq!(h.write(chunk, Mode::Blocking), Ok(chunk.len()));
        }
        let mut out = vec![0u8; total];
        prop_assert_eq!(h.read(&mut out, Mode::Blocking), Ok(total));
        prop_assert_eq!(out, chunks.concat());
    }
}
