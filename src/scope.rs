use std::cell::RefCell;

use crate::{Computed, Handle};

/// Something that holds subscriptions and can release them.
pub trait Dispose {
	fn dispose(&self);
}

impl Dispose for Handle {
	fn dispose(&self) {
		self.revoke()
	}
}

impl<T> Dispose for Computed<T>
where
	T: PartialEq + 'static,
{
	fn dispose(&self) {
		Computed::dispose(self)
	}
}

/// Owns registrations and derived values created for a bounded lifetime.
///
/// Everything kept in the scope is disposed, newest first, when the scope is
/// disposed or dropped.
#[derive(Default)]
pub struct Scope {
	owned: RefCell<Vec<Box<dyn Dispose>>>,
}

impl Scope {
	pub fn new() -> Self {
		Scope::default()
	}

	/// Records `item` for disposal and hands it back.
	pub fn keep<D>(&self, item: D) -> D
	where
		D: Dispose + Clone + 'static,
	{
		self.owned.borrow_mut().push(Box::new(item.clone()));
		item
	}

	pub fn len(&self) -> usize {
		self.owned.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.owned.borrow().is_empty()
	}
}

impl Dispose for Scope {
	fn dispose(&self) {
		let owned = std::mem::take(&mut *self.owned.borrow_mut());
		if owned.is_empty() {
			return;
		}

		tracing::debug!(items = owned.len(), "dispose scope");

		for item in owned.into_iter().rev() {
			item.dispose();
		}
	}
}

impl Drop for Scope {
	fn drop(&mut self) {
		Dispose::dispose(self);
	}
}
