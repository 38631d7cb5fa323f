use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::listeners::{ListenerId, Listeners};

type Subscriptions = SmallVec<[(Weak<Listeners>, ListenerId); 2]>;

/// Unregistration handle returned by every registration call.
///
/// Dropping a handle does not unsubscribe anything: call [`Handle::revoke`]
/// (or hand the handle to a [`Scope`](crate::Scope)). Clones refer to the same
/// registration.
#[must_use = "a registration stays active until its handle is revoked"]
#[derive(Clone, Default)]
pub struct Handle {
	subscriptions: Rc<RefCell<Subscriptions>>,
}

impl Handle {
	pub(crate) fn new() -> Self {
		Handle::default()
	}

	pub(crate) fn push(&self, listeners: &Rc<Listeners>, id: ListenerId) {
		self.subscriptions
			.borrow_mut()
			.push((Rc::downgrade(listeners), id));
	}

	/// Moves the subscriptions of `other` into this handle.
	pub(crate) fn absorb(&self, other: Handle) {
		let taken = std::mem::take(&mut *other.subscriptions.borrow_mut());
		self.subscriptions.borrow_mut().extend(taken);
	}

	/// Removes every subscription created by the registration.
	///
	/// Idempotent. Safe to call from inside a reaction that is currently
	/// firing.
	pub fn revoke(&self) {
		let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
		if subscriptions.is_empty() {
			return;
		}

		tracing::trace!(subscriptions = subscriptions.len(), "revoke");

		for (listeners, id) in subscriptions {
			if let Some(listeners) = listeners.upgrade() {
				listeners.remove(id);
			}
		}
	}

	pub fn is_revoked(&self) -> bool {
		self.subscriptions.borrow().is_empty()
	}
}

impl fmt::Debug for Handle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handle")
			.field("subscriptions", &self.subscriptions.borrow().len())
			.finish()
	}
}
