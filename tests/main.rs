use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use mockall::predicate::eq;
use observe_props::{
	combine_from, compute_from, consume, filter_from, now_and_on_change, on_change, register,
	register_now_and_on_change, set_if_unbound, Dispose, Handle, Observable, Scope, Trigger, Var,
};


use mock::{init_tracing, Spy};

fn log() -> Rc<RefCell<Vec<String>>> {
	Rc::new(RefCell::new(vec![]))
}

#[test]
fn computed_doubles_source() {
	init_tracing();

	let src = Var::new(1i64);
	let d = compute_from(&src, |v| v * 2);
	assert_eq!(d.get(), 2);

	let mock = mock::SharedMock::new();
	mock.get().expect_changed().with(eq(10)).times(1).return_const(());

	let _handle = register(
		{
			let d = d.clone();
			let mock = mock.clone();
			move |_| mock.get().changed(d.get())
		},
		&[&d],
	)
	.unwrap();

	src.set(5);
	assert_eq!(d.get(), 10);

	mock.get().checkpoint();
}

#[test]
fn firings_match_value_changing_writes() {
	init_tracing();

	let a = Var::new(0i64);
	let mock = mock::SharedMock::new();

	let _handle = register(
		{
			let a = a.clone();
			let mock = mock.clone();
			move |_| mock.get().changed(a.get())
		},
		&[&a],
	)
	.unwrap();

	mock.get().expect_changed().times(2).return_const(());

	a.set(1);
	a.set(1);
	a.set(2);
	a.set(2);

	mock.get().checkpoint();
}

#[test]
fn now_and_on_change_fires_before_returning() {
	init_tracing();

	let a = Var::new(3i64);
	let mock = mock::SharedMock::new();

	mock.get().expect_initial().times(1).return_const(());

	let handle = register_now_and_on_change(
		{
			let a = a.clone();
			let mock = mock.clone();
			move |trigger| match trigger {
				Trigger::Initial(_) => mock.get().initial(),
				Trigger::Changed(_) => mock.get().changed(a.get()),
			}
		},
		&[&a],
	)
	.unwrap();

	mock.get().checkpoint();

	mock.get().expect_changed().with(eq(4)).times(1).return_const(());
	a.set(4);
	mock.get().checkpoint();

	handle.revoke();
	a.set(5);
}

#[test]
fn revoke_only_affects_own_registration() {
	init_tracing();

	let a = Var::new(0i64);
	let b = Var::new(0i64);
	let kept = mock::SharedMock::new();
	let revoked = mock::SharedMock::new();

	let keep_handle = register(
		{
			let a = a.clone();
			let kept = kept.clone();
			move |_| kept.get().changed(a.get())
		},
		&[&a],
	)
	.unwrap();

	let revoke_handle = register(
		{
			let revoked = revoked.clone();
			move |_| revoked.get().changed(-1)
		},
		&[&a, &b],
	)
	.unwrap();

	revoke_handle.revoke();
	revoke_handle.revoke();

	kept.get().expect_changed().with(eq(1)).times(1).return_const(());
	revoked.get().expect_changed().times(0);

	a.set(1);
	b.set(1);

	kept.get().checkpoint();
	revoked.get().checkpoint();
	assert!(!keep_handle.is_revoked());
	assert!(b.listeners().is_empty());
}

#[test]
fn combine_sees_reentrant_write() {
	init_tracing();

	let a = Var::new(0);
	let b = Var::new(0);
	let combined = combine_from(&a, &b, |a, b| (*a, *b));

	let _handle = register(
		{
			let a = a.clone();
			let b = b.clone();
			move |_| b.set(a.get() * 100)
		},
		&[&a],
	)
	.unwrap();

	a.set(7);
	assert_eq!(combined.get(), (7, 700));
}

#[test]
fn filter_suppresses_updates_while_predicate_fails() {
	init_tracing();

	let a = Var::new(true);
	let b = Var::new(String::from("x"));
	let c = filter_from(&b, {
		let a = a.clone();
		move |_| a.get()
	});

	a.set(false);
	b.set(String::from("y"));
	assert_eq!(c.get().as_deref(), Some("x"));
}

#[test]
fn nested_waves_run_depth_first() {
	init_tracing();

	let a = Var::new(0);
	let b = Var::new(0);
	let order = log();

	let _first = register(
		{
			let a = a.clone();
			let b = b.clone();
			let order = order.clone();
			move |_| {
				order.borrow_mut().push("a:first".to_string());
				b.set(a.get());
			}
		},
		&[&a],
	)
	.unwrap();

	let _on_b = register(
		{
			let order = order.clone();
			move |_| order.borrow_mut().push("b".to_string())
		},
		&[&b],
	)
	.unwrap();

	let _second = register(
		{
			let order = order.clone();
			move |_| order.borrow_mut().push("a:second".to_string())
		},
		&[&a],
	)
	.unwrap();

	a.set(1);
	assert_eq!(*order.borrow(), vec!["a:first", "b", "a:second"]);
}

#[test]
fn reaction_can_revoke_itself_while_firing() {
	init_tracing();

	let a = Var::new(0);
	let order = log();
	let slot: Rc<RefCell<Option<Handle>>> = Rc::new(RefCell::new(None));

	let handle = register(
		{
			let slot = slot.clone();
			let order = order.clone();
			move |_| {
				order.borrow_mut().push("once".to_string());
				if let Some(handle) = slot.borrow().as_ref() {
					handle.revoke();
				}
			}
		},
		&[&a],
	)
	.unwrap();
	*slot.borrow_mut() = Some(handle.clone());

	let _after = register(
		{
			let order = order.clone();
			move |_| order.borrow_mut().push("after".to_string())
		},
		&[&a],
	)
	.unwrap();

	a.set(1);
	a.set(2);

	assert!(handle.is_revoked());
	assert_eq!(*order.borrow(), vec!["once", "after", "after"]);
}

#[test]
fn reaction_panic_reaches_the_writer() {
	init_tracing();

	let a = Var::new(0);
	let order = log();

	let _faulty = register(
		{
			let a = a.clone();
			move |_| {
				if a.get() < 0 {
					panic!("negative");
				}
			}
		},
		&[&a],
	)
	.unwrap();

	let _later = register(
		{
			let order = order.clone();
			let a = a.clone();
			move |_| order.borrow_mut().push(a.get().to_string())
		},
		&[&a],
	)
	.unwrap();

	let result = catch_unwind(AssertUnwindSafe(|| a.set(-1)));
	assert!(result.is_err());
	assert_eq!(a.get(), -1);
	assert!(order.borrow().is_empty());

	a.set(2);
	assert_eq!(*order.borrow(), vec!["2"]);
}

#[test]
fn reaction_writes_its_own_source() {
	init_tracing();

	let a = Var::new(0);
	let _step = register(
		{
			let a = a.clone();
			move |_| {
				if a.get() < 5 {
					a.set(a.get() + 1);
				}
			}
		},
		&[&a],
	)
	.unwrap();

	a.set(1);
	assert_eq!(a.get(), 5);
}

#[test]
fn consume_writes_its_own_source() {
	init_tracing();

	let a = Var::new(0);
	let seen = log();
	let _clamp = consume(&a, {
		let a = a.clone();
		let seen = seen.clone();
		move |v: &i32| {
			seen.borrow_mut().push(v.to_string());
			if *v > 5 {
				a.set(5);
			}
		}
	});

	a.set(10);
	assert_eq!(a.get(), 5);
	assert_eq!(*seen.borrow(), vec!["0", "10", "5"]);
}

#[test]
fn default_unless_bound() {
	init_tracing();

	let theme = Var::new("dark");
	let setting = Var::new("");

	set_if_unbound(&setting, "light");
	assert_eq!(setting.get(), "light");

	setting.bind(&theme);
	set_if_unbound(&setting, "light");
	assert_eq!(setting.get(), "dark");

	theme.set("contrast");
	assert_eq!(setting.get(), "contrast");
}

#[test]
fn scope_releases_derived_values() {
	init_tracing();

	let src = Var::new(1);
	let scope = Scope::new();
	let label = scope.keep(compute_from(&src, |v| format!("#{v}")));
	let inner = scope.keep(compute_from(&label, |s| s.len()));

	src.set(10);
	assert_eq!(inner.get(), 3);

	scope.dispose();
	src.set(1000);

	assert_eq!(label.get(), "#10");
	assert!(src.listeners().is_empty());
	assert!(label.listeners().is_empty());
}

#[test]
fn macros_clone_captures() {
	init_tracing();

	let a = Var::new(1);
	let b = Var::new(2);
	let sum = Var::new(0);

	let handle = now_and_on_change!((a, b, sum) _trigger => {
		sum.set(a.get() + b.get());
	}; a, b)
	.unwrap();
	assert_eq!(sum.get(), 3);

	b.set(5);
	assert_eq!(sum.get(), 6);

	let hits = Rc::new(RefCell::new(0));
	let counter = on_change!((hits) trigger => {
		assert!(!trigger.is_initial());
		*hits.borrow_mut() += 1;
	}; sum)
	.unwrap();

	a.set(2);
	assert_eq!(*hits.borrow(), 1);

	handle.revoke();
	counter.revoke();
}
