use std::cell::Ref;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use crate::listeners::Listeners;
use crate::Observable;

/// Read access implemented by observable bodies.
pub trait Access<T>: Observable {
	fn read(&self) -> Ref<'_, T>;

	/// Whether the value is driven by other observables.
	fn is_bound(&self) -> bool;
}

/// Anything that can be turned into a shared [`Value`].
pub trait Readable<T>: Observable {
	fn to_value(&self) -> Value<T>;
}

/// Type-erased, shared read handle over any observable of `T`.
pub struct Value<T> {
	value: Rc<dyn Access<T>>,
}

impl<T> Clone for Value<T> {
	fn clone(&self) -> Self {
		Value {
			value: self.value.clone(),
		}
	}
}

impl<T> Value<T>
where
	T: 'static,
{
	pub fn new(value: Rc<dyn Access<T>>) -> Self {
		Value { value }
	}

	#[inline]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.value.read().clone()
	}

	#[inline]
	pub fn with<R>(&self, func: impl FnOnce(&T) -> R) -> R {
		func(&*self.value.read())
	}

	#[inline]
	pub fn is_bound(&self) -> bool {
		self.value.is_bound()
	}

	pub fn downgrade(&self) -> WeakValue<T> {
		WeakValue {
			value: Rc::downgrade(&self.value),
		}
	}
}

impl<T: 'static> Observable for Value<T> {
	fn listeners(&self) -> &Rc<Listeners> {
		self.value.listeners()
	}
}

impl<T: 'static> Readable<T> for Value<T> {
	fn to_value(&self) -> Value<T> {
		self.clone()
	}
}

impl<T> Debug for Value<T>
where
	T: Debug + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.with(|value| value.fmt(f))
	}
}

/// Non-owning counterpart of [`Value`].
///
/// Derivations hold their sources weakly: the source owns the listener that
/// owns the derivation, so a strong reference back would form a cycle.
pub struct WeakValue<T> {
	value: Weak<dyn Access<T>>,
}

impl<T> Clone for WeakValue<T> {
	fn clone(&self) -> Self {
		WeakValue {
			value: self.value.clone(),
		}
	}
}

impl<T: 'static> WeakValue<T> {
	pub fn upgrade(&self) -> Option<Value<T>> {
		self.value.upgrade().map(Value::new)
	}
}
