//! Scripted I2C bus for exercising the driver without hardware.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, Operation};

/// Error injected by a scripted step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BusFault;

impl embedded_hal_async::i2c::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One expected bus transaction, in order.
#[derive(Clone, Copy, Debug)]
pub enum Step {
    /// Expect a plain write; respond with the scripted result.
    Write(Result<(), BusFault>),
    /// Expect a one-byte register read; yield the scripted byte or fault.
    ReadByte(Result<u8, BusFault>),
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Step>,
    writes: Vec<Vec<u8>>,
}

/// Clonable bus handle; clones share the script and the write log, so a test
/// can keep one clone for inspection after a runner consumed the other.
#[derive(Clone, Default)]
pub struct ScriptBus(Rc<RefCell<Inner>>);

impl ScriptBus {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            script: steps.into_iter().collect(),
            writes: Vec::new(),
        })))
    }

    /// Every write payload seen so far, including ones that faulted.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.0.borrow().writes.clone()
    }
}

impl ErrorType for ScriptBus {
    type Error = BusFault;
}

impl I2c for ScriptBus {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), BusFault> {
        assert_eq!(address, 0x3f, "unexpected device address");
        let mut inner = self.0.borrow_mut();
        let step = inner
            .script
            .pop_front()
            .expect("bus transaction beyond the end of the script");
        match (&mut *operations, step) {
            ([Operation::Write(data)], Step::Write(result)) => {
                inner.writes.push(data.to_vec());
                result
            }
            ([Operation::Write(_), Operation::Read(buffer)], Step::ReadByte(result)) => {
                buffer[0] = result?;
                Ok(())
            }
            (_, step) => panic!("transaction shape does not match scripted {step:?}"),
        }
    }
}
