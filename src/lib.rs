//! Synchronous observable properties.
//!
//! [`Var`] holds a value set by callers, [`Computed`] holds a value derived
//! from other observables, and [`register`] attaches reactions to any of them.
//! Every registration returns a [`Handle`]; nothing stops firing until that
//! handle is revoked.
//!
//! Propagation is inline on the writing thread. Listeners of one observable
//! fire in registration order, and a write made by a listener runs its whole
//! wave before the outer wave continues.

pub mod macros;

mod addr;
mod computed;
mod error;
mod handle;
mod listeners;
mod microtask;
mod reaction;
mod runtime;
mod scope;
mod value;
mod var;

use std::rc::Rc;

pub use addr::ObservableId;
pub use computed::{combine_from, compute_from, filter_from, not, Computed};
pub use error::{Error, Result};
pub use handle::Handle;
pub use listeners::Listeners;
pub use reaction::{consume, on_set, register, register_now_and_on_change, Trigger};
#[cfg(target_arch = "wasm32")]
pub use runtime::MicrotaskScheduler;
pub use runtime::{QueueScheduler, Runtime, Scheduler, Task};
pub use scope::{Dispose, Scope};
pub use value::{Access, Readable, Value, WeakValue};
pub use var::{bind_bidirectional, set_if_unbound, Toggle, Var};

pub trait Observable {
	/// The listener list notified on every change of this observable.
	fn listeners(&self) -> &Rc<Listeners>;

	fn id(&self) -> ObservableId {
		self.listeners().id()
	}
}
