use std::cell::{Cell, Ref, RefCell};
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::listeners::Listeners;
use crate::reaction::subscribe_all;
use crate::value::{Access, Readable, Value};
use crate::{Error, Handle, Observable, Result};

/// A source observable: a one-slot mutable cell with a listener list.
///
/// Writes that leave the value equal to the current one notify nobody.
pub struct Var<T> {
	body: Rc<VarBody<T>>,
}

pub struct VarBody<T> {
	value: RefCell<T>,
	listeners: Rc<Listeners>,
	binding: RefCell<Option<Handle>>,
}

impl<T> Clone for Var<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Default for Var<T>
where
	T: Default,
{
	fn default() -> Self {
		Var::new(Default::default())
	}
}

pub trait Toggle {
	fn toggle(&mut self);
}

impl Toggle for bool {
	fn toggle(&mut self) {
		*self = !*self
	}
}

impl<T> Var<T> {
	pub fn new(value: T) -> Self {
		Var {
			body: Rc::new(VarBody {
				value: RefCell::new(value),
				listeners: Listeners::new(),
				binding: RefCell::new(None),
			}),
		}
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

	/// Writes `value`, notifying listeners when it differs from the current
	/// one.
	///
	/// # Panics
	///
	/// Panics when the var is bound. Use [`Var::try_set`] or
	/// [`set_if_unbound`] to handle that case.
	#[inline]
	pub fn set(&self, value: T)
	where
		T: PartialEq,
	{
		if let Err(err) = self.try_set(value) {
			panic!("{}", err)
		}
	}

	pub fn try_set(&self, value: T) -> Result<()>
	where
		T: PartialEq,
	{
		if self.is_bound() {
			tracing::warn!(observable = ?self.id(), "rejected write to a bound var");
			return Err(Error::Bound);
		}

		self.body.write(value);
		Ok(())
	}

	/// Writes `value` and returns the previous one.
	///
	/// # Panics
	///
	/// Panics when the var is bound.
	pub fn replace(&self, value: T) -> T
	where
		T: PartialEq,
	{
		if self.is_bound() {
			panic!("{}", Error::Bound)
		}

		let (old, changed) = {
			let mut current = self.body.value.borrow_mut();
			let old = std::mem::replace(&mut *current, value);
			let changed = old != *current;
			(old, changed)
		};

		if changed {
			self.body.listeners.notify();
		}

		old
	}

	/// Mutates the value in place. `func` must not read this var.
	///
	/// # Panics
	///
	/// Panics when the var is bound.
	pub fn update(&self, func: impl FnOnce(&mut T))
	where
		T: Clone + PartialEq,
	{
		if self.is_bound() {
			panic!("{}", Error::Bound)
		}

		let changed = {
			let mut current = self.body.value.borrow_mut();
			let before = current.clone();
			func(&mut current);
			*current != before
		};

		if changed {
			self.body.listeners.notify();
		}
	}

	#[inline]
	pub fn toggle(&self)
	where
		T: Toggle + Clone + PartialEq,
	{
		self.update(T::toggle)
	}

	/// Makes this var mirror `source` until [`Var::unbind`].
	///
	/// Replaces any previous binding. While bound, direct writes are rejected.
	pub fn bind(&self, source: &impl Readable<T>)
	where
		T: Clone + PartialEq + 'static,
	{
		self.unbind();

		let source = source.to_value();
		self.body.write(source.get());

		let weak_source = source.downgrade();
		let target = Rc::downgrade(&self.body);
		let handle = subscribe_all(
			Rc::new(move |_| {
				if let (Some(source), Some(target)) = (weak_source.upgrade(), target.upgrade()) {
					target.write(source.get());
				}
			}),
			&[&source],
		);

		*self.body.binding.borrow_mut() = Some(handle);
	}

	pub fn unbind(&self) {
		let binding = self.body.binding.borrow_mut().take();
		if let Some(handle) = binding {
			handle.revoke();
		}
	}

	#[inline]
	pub fn is_bound(&self) -> bool {
		self.body.binding.borrow().is_some()
	}

	pub(crate) fn downgrade(&self) -> Weak<VarBody<T>> {
		Rc::downgrade(&self.body)
	}
}

impl<T> VarBody<T> {
	/// Stores `value` bypassing the bound check.
	pub(crate) fn write(&self, value: T)
	where
		T: PartialEq,
	{
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

/// Writes `value` into `target` unless `target` is bound.
///
/// Implements "default unless overridden": a bound var keeps following its
/// source.
pub fn set_if_unbound<T>(target: &Var<T>, value: T)
where
	T: PartialEq,
{
	if !target.is_bound() {
		target.body.write(value);
	}
}

/// Keeps `a` and `b` equal.
///
/// `b` first takes the value of `a`; afterwards a change to either side is
/// copied to the other. Revoking the handle disconnects both directions.
pub fn bind_bidirectional<T>(a: &Var<T>, b: &Var<T>) -> Handle
where
	T: Clone + PartialEq + 'static,
{
	b.body.write(a.get());

	let syncing = Rc::new(Cell::new(false));
	let handle = mirror(a, b, syncing.clone());
	handle.absorb(mirror(b, a, syncing));
	handle
}

fn mirror<T>(from: &Var<T>, to: &Var<T>, syncing: Rc<Cell<bool>>) -> Handle
where
	T: Clone + PartialEq + 'static,
{
	let source = from.downgrade();
	let target = to.downgrade();
	subscribe_all(
		Rc::new(move |_| {
			if syncing.get() {
				return;
			}
			if let (Some(source), Some(target)) = (source.upgrade(), target.upgrade()) {
				let value = source.value.borrow().clone();
				let _syncing = Syncing::enter(&syncing);
				target.write(value);
			}
		}),
		&[from],
	)
}

/// Marks a mirrored write in flight; cleared on drop, including unwinds.
struct Syncing<'a>(&'a Cell<bool>);

impl<'a> Syncing<'a> {
	fn enter(flag: &'a Cell<bool>) -> Self {
		flag.set(true);
		Syncing(flag)
	}
}

impl Drop for Syncing<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

impl<T> Observable for Var<T> {
	fn listeners(&self) -> &Rc<Listeners> {
		&self.body.listeners
	}
}

impl<T> Observable for VarBody<T> {
	fn listeners(&self) -> &Rc<Listeners> {
		&self.listeners
	}
}

impl<T> Access<T> for VarBody<T> {
	fn read(&self) -> Ref<'_, T> {
		self.value.borrow()
	}

	fn is_bound(&self) -> bool {
		self.binding.borrow().is_some()
	}
}

impl<T: 'static> Readable<T> for Var<T> {
	fn to_value(&self) -> Value<T> {
		Value::from(self.clone())
	}
}

impl<T> From<Var<T>> for Value<T>
where
	T: 'static,
{
	fn from(var: Var<T>) -> Self {
		Value::new(var.body)
	}
}

impl<T> Debug for Var<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.with(|value| value.fmt(f))
	}
}
