use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::reaction::subscribe_all;
use crate::value::Readable;
use crate::Handle;

pub type Task = Box<dyn FnOnce()>;

/// Decides when deferred work runs.
pub trait Scheduler {
	fn schedule(&self, task: Task);

	/// Runs whatever is pending and returns how many tasks ran. Schedulers
	/// driven by their host return `0`.
	fn flush(&self) -> usize {
		0
	}
}

/// Keeps tasks until [`Scheduler::flush`] is called.
#[derive(Default)]
pub struct QueueScheduler {
	queue: RefCell<VecDeque<Task>>,
}

impl QueueScheduler {
	pub fn new() -> Self {
		QueueScheduler::default()
	}

	pub fn pending(&self) -> usize {
		self.queue.borrow().len()
	}
}

impl Scheduler for QueueScheduler {
	fn schedule(&self, task: Task) {
		self.queue.borrow_mut().push_back(task);
	}

	/// Tasks scheduled while flushing run in the same flush.
	fn flush(&self) -> usize {
		let mut ran = 0;
		loop {
			let task = self.queue.borrow_mut().pop_front();
			match task {
				Some(task) => {
					task();
					ran += 1;
				}
				None => break,
			}
		}

		if ran > 0 {
			tracing::trace!(tasks = ran, "flush");
		}
		ran
	}
}

/// Runs tasks on the JS microtask queue.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct MicrotaskScheduler;

#[cfg(target_arch = "wasm32")]
impl Scheduler for MicrotaskScheduler {
	fn schedule(&self, task: Task) {
		crate::microtask::queue(task);
	}
}

/// Explicit context for deferred delivery.
///
/// Cheap to clone; clones share the scheduler.
#[derive(Clone)]
pub struct Runtime {
	scheduler: Rc<dyn Scheduler>,
}

impl Default for Runtime {
	fn default() -> Self {
		Runtime::new()
	}
}

impl Runtime {
	pub fn new() -> Self {
		Runtime::with_scheduler(QueueScheduler::new())
	}

	pub fn with_scheduler(scheduler: impl Scheduler + 'static) -> Self {
		Runtime {
			scheduler: Rc::new(scheduler),
		}
	}

	pub fn schedule(&self, task: impl FnOnce() + 'static) {
		self.scheduler.schedule(Box::new(task));
	}

	pub fn flush(&self) -> usize {
		self.scheduler.flush()
	}

	/// Like [`consume`](crate::consume), but every delivery goes through the
	/// scheduler with the value read at the time of the change.
	pub fn consume_deferred<T, S>(&self, source: &S, consumer: impl Fn(T) + 'static) -> Handle
	where
		T: Clone + 'static,
		S: Readable<T>,
	{
		let consumer = Rc::new(consumer);
		let value = source.to_value();

		let deliver = {
			let scheduler = self.scheduler.clone();
			move |current: T| {
				let consumer = consumer.clone();
				scheduler.schedule(Box::new(move || consumer(current)));
			}
		};

		deliver(value.get());

		let weak = value.downgrade();
		subscribe_all(
			Rc::new(move |_| {
				if let Some(value) = weak.upgrade() {
					deliver(value.get());
				}
			}),
			&[&value],
		)
	}
}
