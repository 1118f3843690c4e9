//! Button event channel.
//!
//! The input co-processor delivers discrete press/release events from its
//! interrupt context; the launcher (or whichever host routine currently owns
//! the receiver) drains them.
//!
//! ```text
//!  co-processor ISR ──┐
//!  bench stdin      ──┼──► Sender ──► [ VecDeque, bounded ] ──► Receiver
//!  test harness     ──┘                                   (launcher / host routine)
//! ```
//!
//! Receiving blocks with no timeout. An unattended device waiting on an
//! error screen simply stays there until someone presses a button. The only
//! way out of a blocking receive besides an event is every sender going away.
//! While the queue is empty the receiver calls its idle hook between polls:
//! a spin hint by default, a short sleep on hosted builds.

#![no_std]

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use spin::Mutex;

/// Queue depth used by the co-processor driver.
pub const DEFAULT_CAPACITY: usize = 32;

/// Physical inputs reported by the co-processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    JoystickDown,
    JoystickUp,
    JoystickLeft,
    JoystickRight,
    JoystickPress,
    Home,
    Menu,
    Select,
    Start,
    Accept,
    Back,
    /// Anything else the co-processor reports (charger, CDONE line, ...).
    Other(u8),
}

impl Input {
    /// Decode the co-processor's input number.
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Input::Home,
            1 => Input::Menu,
            2 => Input::Start,
            3 => Input::Accept,
            4 => Input::Back,
            7 => Input::Select,
            8 => Input::JoystickLeft,
            9 => Input::JoystickPress,
            10 => Input::JoystickDown,
            11 => Input::JoystickUp,
            12 => Input::JoystickRight,
            other => Input::Other(other),
        }
    }
}

/// One press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub input: Input,
    pub pressed: bool,
}

impl ButtonEvent {
    pub const fn press(input: Input) -> Self {
        Self {
            input,
            pressed: true,
        }
    }

    pub const fn release(input: Input) -> Self {
        Self {
            input,
            pressed: false,
        }
    }

    /// A press of A (accept) or B (back) dismisses an error screen.
    pub fn is_acknowledge(&self) -> bool {
        self.pressed && matches!(self.input, Input::Accept | Input::Back)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("button queue full")]
    Full,
    #[error("button channel disconnected")]
    Disconnected,
}

pub type Result<T> = core::result::Result<T, ChannelError>;

struct Shared {
    queue: Mutex<VecDeque<ButtonEvent>>,
    capacity: usize,
    senders: AtomicUsize,
    receiver_alive: AtomicBool,
}

/// Create a bounded channel.
pub fn channel(capacity: usize) -> (Sender, Receiver) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::with_capacity(capacity)),
        capacity,
        senders: AtomicUsize::new(1),
        receiver_alive: AtomicBool::new(true),
    });
    (
        Sender {
            shared: shared.clone(),
        },
        Receiver {
            shared,
            idle: core::hint::spin_loop,
        },
    )
}

/// Producer half. Cheap to clone; one per event source.
pub struct Sender {
    shared: Arc<Shared>,
}

impl Sender {
    /// Enqueue an event without blocking.
    pub fn send(&self, event: ButtonEvent) -> Result<()> {
        if !self.shared.receiver_alive.load(Ordering::Acquire) {
            return Err(ChannelError::Disconnected);
        }
        let mut queue = self.shared.queue.lock();
        if queue.len() >= self.shared.capacity {
            return Err(ChannelError::Full);
        }
        queue.push_back(event);
        Ok(())
    }
}

impl Clone for Sender {
    fn clone(&self) -> Self {
        self.shared.senders.fetch_add(1, Ordering::AcqRel);
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.shared.senders.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Consumer half. Exactly one exists per channel.
pub struct Receiver {
    shared: Arc<Shared>,
    idle: fn(),
}

impl Receiver {
    /// Replace the hook called between polls of an empty queue.
    pub fn set_idle(&mut self, idle: fn()) {
        self.idle = idle;
    }

    /// Pop the oldest event, if any.
    pub fn try_recv(&mut self) -> Option<ButtonEvent> {
        self.shared.queue.lock().pop_front()
    }

    /// Block until an event arrives.
    ///
    /// Returns `Disconnected` only once the queue is empty and every sender
    /// has been dropped.
    pub fn recv(&mut self) -> Result<ButtonEvent> {
        let idle = self.idle;
        self.recv_with(idle)
    }

    /// [`recv`](Self::recv) with an explicit idle hook.
    pub fn recv_with(&mut self, mut idle: impl FnMut()) -> Result<ButtonEvent> {
        loop {
            if let Some(event) = self.try_recv() {
                return Ok(event);
            }
            if self.shared.senders.load(Ordering::Acquire) == 0 {
                // A sender may have pushed right before dropping.
                return self.try_recv().ok_or(ChannelError::Disconnected);
            }
            idle();
        }
    }

    /// Block until A or B is pressed, discarding everything else.
    pub fn wait_for_acknowledge(&mut self) -> Result<ButtonEvent> {
        loop {
            let event = self.recv()?;
            if event.is_acknowledge() {
                return Ok(event);
            }
        }
    }

    /// Drop every queued event. Returns how many were discarded.
    pub fn clear(&mut self) -> usize {
        let mut queue = self.shared.queue.lock();
        let n = queue.len();
        queue.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the queue is drained and no sender remains.
    pub fn is_disconnected(&self) -> bool {
        self.shared.senders.load(Ordering::Acquire) == 0 && self.is_empty()
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        self.shared.receiver_alive.store(false, Ordering::Release);
    }
}
