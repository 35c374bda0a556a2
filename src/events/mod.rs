//! # Events Module
//!
//! Progress reporting for front ends.
//!
//! The engine emits typed events through a channel; a front end (the CLI's
//! progress bar, a log sink, a GUI) subscribes on another thread. Events
//! carry copies of what happened and never feed back into the engine.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Copy(CopyEvent::Progress(p)) = event {
//!             println!("{}/{} copied", p.copied, p.batch_size);
//!         }
//!     }
//! });
//!
//! engine.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
