use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::addr::ObservableId;
use crate::reaction::Trigger;

pub type Listener = Rc<dyn Fn(Trigger)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

type Entries = SmallVec<[(ListenerId, Listener); 4]>;

/// Ordered list of change listeners owned by one observable.
pub struct Listeners {
	id: ObservableId,
	entries: RefCell<Entries>,
	next: Cell<u64>,
}

impl Listeners {
	pub(crate) fn new() -> Rc<Self> {
		Rc::new(Listeners {
			id: ObservableId::next(),
			entries: RefCell::new(SmallVec::new()),
			next: Cell::new(0),
		})
	}

	pub fn id(&self) -> ObservableId {
		self.id
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	pub(crate) fn add(&self, listener: Listener) -> ListenerId {
		let id = ListenerId(self.next.get());
		self.next.set(id.0 + 1);
		self.entries.borrow_mut().push((id, listener));
		id
	}

	pub(crate) fn remove(&self, id: ListenerId) -> bool {
		let mut entries = self.entries.borrow_mut();
		match entries.iter().position(|(entry, _)| *entry == id) {
			Some(index) => {
				entries.remove(index);
				true
			}
			None => false,
		}
	}

	fn contains(&self, id: ListenerId) -> bool {
		self.entries.borrow().iter().any(|(entry, _)| *entry == id)
	}

	/// Runs one change wave.
	///
	/// Listeners fire in registration order over a snapshot taken when the wave
	/// starts. A listener removed by an earlier listener of the same wave is
	/// skipped. No borrow is held while a listener runs, so listeners may write
	/// observables (starting a nested wave) or revoke registrations.
	pub(crate) fn notify(&self) {
		let snapshot: Entries = self.entries.borrow().clone();
		let id = self.id();

		tracing::trace!(observable = ?id, listeners = snapshot.len(), "change wave");

		for (listener_id, listener) in snapshot {
			if self.contains(listener_id) {
				listener(Trigger::Changed(id));
			}
		}
	}
}
