use std::cell::Cell;
use std::rc::Rc;

/// Identifies one file selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Hands out tickets for file reads so that a read finishing after a newer
/// selection can be recognized and dropped.
#[derive(Clone, Debug, Default)]
pub struct RequestTracker {
	latest: Rc<Cell<u64>>,
}

impl RequestTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a new request, superseding all earlier ones.
	pub fn begin(&self) -> RequestTicket {
		let next = self.latest.get().wrapping_add(1);
		self.latest.set(next);
		RequestTicket(next)
	}

	pub fn is_current(&self, ticket: RequestTicket) -> bool {
		self.latest.get() == ticket.0
	}
}
