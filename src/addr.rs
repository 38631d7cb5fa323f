use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT: AtomicU64 = AtomicU64::new(0);

/// Identity of an observable.
///
/// Allocated once per observable from a process-wide counter and never
/// reused, so an id taken from a dropped observable never matches a new one.
/// All handles to the same observable report the same id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObservableId(u64);

impl ObservableId {
	pub(crate) fn next() -> Self {
		ObservableId(NEXT.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Debug for ObservableId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ObservableId({})", self.0)
	}
}

#[cfg(test)]
mod tests {
	use crate::{Observable, Var};

	#[test]
	fn clones_share_identity() {
		let a = Var::new(1);
		let b = a.clone();
		let c = Var::new(1);

		assert_eq!(a.id(), b.id());
		assert_ne!(a.id(), c.id());
	}

	#[test]
	fn value_reports_the_same_identity() {
		let a = Var::new("x");
		let value = crate::Value::from(a.clone());

		assert_eq!(a.id(), value.id());
	}

	#[test]
	fn ids_are_not_reused_after_drop() {
		let stale = Var::new(0).id();
		let fresh: Vec<_> = (0..16).map(|_| Var::new(0).id()).collect();

		assert!(fresh.iter().all(|id| *id != stale));
	}
}
