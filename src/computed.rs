use std::cell::{Cell, Ref, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::listeners::Listeners;
use crate::reaction::subscribe_all;
use crate::value::{Access, Readable, Value};
use crate::{Handle, Observable};

/// A read-only observable whose value is derived from other observables.
///
/// The upstream subscription is created once, at construction, and keeps
/// this value alive for as long as its sources live. Call
/// [`Computed::dispose`] (or keep it in a [`Scope`](crate::Scope)) to release
/// it.
pub struct Computed<T> {
	body: Rc<ComputedBody<T>>,
}

pub struct ComputedBody<T> {
	value: RefCell<T>,
	listeners: Rc<Listeners>,
	upstream: Handle,
	disposed: Cell<bool>,
}

impl<T> Clone for Computed<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Computed<T>
where
	T: PartialEq + 'static,
{
	/// Builds a derived value starting at `initial`.
	///
	/// `connect` receives a writer for the new value and returns the upstream
	/// subscription driving it.
	fn derive(initial: T, connect: impl FnOnce(Rc<dyn Fn(T)>) -> Handle) -> Self {
		let body = Rc::new(ComputedBody {
			value: RefCell::new(initial),
			listeners: Listeners::new(),
			upstream: Handle::new(),
			disposed: Cell::new(false),
		});

		let writer = body.clone();
		let upstream = connect(Rc::new(move |value: T| writer.write(value)));
		body.upstream.absorb(upstream);

		Computed { body }
	}

	#[inline]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.body.value.borrow().clone()
	}

	#[inline]
	pub fn with<R>(&self, func: impl FnOnce(&T) -> R) -> R {
		func(&*self.body.value.borrow())
	}

	/// Stops following the sources. The value stays at its last state.
	/// Idempotent.
	pub fn dispose(&self) {
		if !self.body.disposed.replace(true) {
			tracing::debug!(observable = ?self.id(), "dispose computed");
			self.body.upstream.revoke();
		}
	}

	#[inline]
	pub fn is_disposed(&self) -> bool {
		self.body.disposed.get()
	}
}

impl<T> ComputedBody<T>
where
	T: PartialEq,
{
	fn write(&self, value: T) {
		let changed = {
			let mut current = self.value.borrow_mut();
			if *current != value {
				*current = value;
				true
			} else {
				false
			}
		};

		if changed {
			self.listeners.notify();
		}
	}
}

/// Derives `func(source)`, recomputed on every change of `source`.
///
/// A panic in `func` unwinds through the triggering write and leaves the
/// previous value in place. `func` sees a copy of the source value and may
/// write the source.
pub fn compute_from<T, R, S>(source: &S, func: impl Fn(&T) -> R + 'static) -> Computed<R>
where
	T: Clone + 'static,
	R: PartialEq + 'static,
	S: Readable<T>,
{
	let source = source.to_value();
	let initial = func(&source.get());

	Computed::derive(initial, |write| {
		let weak = source.downgrade();
		subscribe_all(
			Rc::new(move |_| {
				if let Some(source) = weak.upgrade() {
					let current = source.get();
					write(func(&current));
				}
			}),
			&[&source],
		)
	})
}

/// Derives `func(a, b)`, recomputed when either source changes.
///
/// Both sources are read at recomputation time, so the result always reflects
/// their current values, including writes made by reactions to the same wave.
pub fn combine_from<A, B, R, SA, SB>(
	a: &SA,
	b: &SB,
	func: impl Fn(&A, &B) -> R + 'static,
) -> Computed<R>
where
	A: Clone + 'static,
	B: Clone + 'static,
	R: PartialEq + 'static,
	SA: Readable<A>,
	SB: Readable<B>,
{
	let a = a.to_value();
	let b = b.to_value();
	let initial = func(&a.get(), &b.get());

	Computed::derive(initial, |write| {
		let weak_a = a.downgrade();
		let weak_b = b.downgrade();
		subscribe_all(
			Rc::new(move |_| {
				if let (Some(a), Some(b)) = (weak_a.upgrade(), weak_b.upgrade()) {
					let (a, b) = (a.get(), b.get());
					write(func(&a, &b));
				}
			}),
			&[&a, &b],
		)
	})
}

/// Follows `source` only while `predicate` accepts its value.
///
/// A rejected value leaves the last accepted one in place; the result is
/// `None` until the first acceptance.
pub fn filter_from<T, S>(source: &S, predicate: impl Fn(&T) -> bool + 'static) -> Computed<Option<T>>
where
	T: Clone + PartialEq + 'static,
	S: Readable<T>,
{
	let source = source.to_value();
	let accept = move |value: T| predicate(&value).then_some(value);
	let initial = accept(source.get());

	Computed::derive(initial, |write| {
		let weak = source.downgrade();
		subscribe_all(
			Rc::new(move |_| {
				if let Some(accepted) = weak.upgrade().and_then(|source| accept(source.get())) {
					write(Some(accepted));
				}
			}),
			&[&source],
		)
	})
}

pub fn not<S>(source: &S) -> Computed<bool>
where
	S: Readable<bool>,
{
	compute_from(source, |value: &bool| !*value)
}

impl<T> Observable for Computed<T> {
	fn listeners(&self) -> &Rc<Listeners> {
		&self.body.listeners
	}
}

impl<T> Observable for ComputedBody<T> {
	fn listeners(&self) -> &Rc<Listeners> {
		&self.listeners
	}
}

impl<T> Access<T> for ComputedBody<T> {
	fn read(&self) -> Ref<'_, T> {
		self.value.borrow()
	}

	fn is_bound(&self) -> bool {
		true
	}
}

impl<T: 'static> Readable<T> for Computed<T> {
	fn to_value(&self) -> Value<T> {
		Value::from(self.clone())
	}
}

impl<T> From<Computed<T>> for Value<T>
where
	T: 'static,
{
	fn from(computed: Computed<T>) -> Self {
		Value::new(computed.body)
	}
}

impl<T> Debug for Computed<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Computed")
			.field("value", &*self.body.value.borrow())
			.field("disposed", &self.body.disposed.get())
			.finish()
	}
}
