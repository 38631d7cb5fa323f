use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use fxhash::FxHashSet;

use crate::listeners::Listener;
use crate::value::Readable;
use crate::{Error, Handle, Observable, ObservableId, Result};

/// Why a reaction is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
	/// The immediate call made by [`register_now_and_on_change`]. Carries the
	/// watched observable when exactly one is watched.
	Initial(Option<ObservableId>),
	/// A change event of this specific observable.
	Changed(ObservableId),
}

impl Trigger {
	pub fn source(&self) -> Option<ObservableId> {
		match *self {
			Trigger::Initial(source) => source,
			Trigger::Changed(source) => Some(source),
		}
	}

	pub fn is_initial(&self) -> bool {
		matches!(self, Trigger::Initial(_))
	}

	/// Whether `observable` caused this run.
	pub fn is(&self, observable: &(impl Observable + ?Sized)) -> bool {
		self.source() == Some(observable.id())
	}
}

fn distinct<'a>(observables: &[&'a dyn Observable]) -> Vec<&'a dyn Observable> {
	let mut seen = FxHashSet::default();
	observables
		.iter()
		.copied()
		.filter(|observable| seen.insert(observable.id()))
		.collect()
}

/// Subscribes one listener per observable. Callers guarantee `observables`
/// is non-empty and distinct.
pub(crate) fn subscribe_all(listener: Listener, observables: &[&dyn Observable]) -> Handle {
	let handle = Handle::new();
	for observable in observables {
		let listeners = observable.listeners();
		let id = listeners.add(listener.clone());
		handle.push(listeners, id);
	}

	tracing::trace!(observables = observables.len(), "register");
	handle
}

/// Runs `reaction` once per change event of any of `observables`.
///
/// An observable listed twice is watched once. Fails with
/// [`Error::NoObservables`] when nothing is watched.
pub fn register(
	reaction: impl Fn(Trigger) + 'static,
	observables: &[&dyn Observable],
) -> Result<Handle> {
	let observables = distinct(observables);
	if observables.is_empty() {
		return Err(Error::NoObservables);
	}

	Ok(subscribe_all(Rc::new(reaction), &observables))
}

/// Like [`register`], but first runs `reaction` synchronously with
/// [`Trigger::Initial`], before any subscription exists.
pub fn register_now_and_on_change(
	reaction: impl Fn(Trigger) + 'static,
	observables: &[&dyn Observable],
) -> Result<Handle> {
	let observables = distinct(observables);
	let initial = match observables.as_slice() {
		[] => return Err(Error::NoObservables),
		[single] => Trigger::Initial(Some(single.id())),
		_ => Trigger::Initial(None),
	};

	reaction(initial);
	Ok(subscribe_all(Rc::new(reaction), &observables))
}

/// Passes the current value of `source` to `consumer` now and after every
/// change.
///
/// The consumer gets a copy of the value, so it may write `source` itself.
pub fn consume<T, S>(source: &S, consumer: impl Fn(&T) + 'static) -> Handle
where
	T: Clone + 'static,
	S: Readable<T>,
{
	let value = source.to_value();
	consumer(&value.get());

	let weak = value.downgrade();
	subscribe_all(
		Rc::new(move |_| {
			if let Some(value) = weak.upgrade() {
				let current = value.get();
				consumer(&current);
			}
		}),
		&[&value],
	)
}

/// Calls `consumer` once with the first `Some` value of `source`.
///
/// Runs immediately when the value is already set; otherwise waits for the
/// first change to `Some` and then revokes its own registration.
pub fn on_set<T, S>(source: &S, consumer: impl FnOnce(T) + 'static) -> Handle
where
	T: Clone + 'static,
	S: Readable<Option<T>>,
{
	let value = source.to_value();
	if let Some(current) = value.get() {
		consumer(current);
		return Handle::new();
	}

	let consumer = RefCell::new(Some(consumer));
	let slot: Rc<OnceCell<Handle>> = Rc::new(OnceCell::new());
	let weak = value.downgrade();

	let handle = subscribe_all(
		Rc::new({
			let slot = slot.clone();
			move |_| {
				let Some(current) = weak.upgrade().and_then(|value| value.get()) else {
					return;
				};
				if let Some(handle) = slot.get() {
					handle.revoke();
				}
				if let Some(consumer) = consumer.borrow_mut().take() {
					consumer(current);
				}
			}
		}),
		&[&value],
	);

	let _ = slot.set(handle.clone());
	handle
}
