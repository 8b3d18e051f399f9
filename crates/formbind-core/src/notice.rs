//! User-facing notices
//!
//! Model saves end with a transient banner. The host decides how banners are
//! shown by handing the form a [`Notifier`]; [`TracingNotifier`] is used when
//! none is set.

use std::cell::RefCell;
use std::fmt;

/// How long success notices stay visible.
pub const SUCCESS_NOTICE_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
	Success,
	Fail,
}

impl NoticeKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::Fail => "fail",
		}
	}
}

impl fmt::Display for NoticeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Sink for success and failure banners.
pub trait Notifier {
	/// Show `text`. `duration_secs` of `None` keeps the notice until dismissed.
	fn notice(&self, kind: NoticeKind, text: &str, duration_secs: Option<u32>);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn notice(&self, kind: NoticeKind, text: &str, duration_secs: Option<u32>) {
		match kind {
			NoticeKind::Success => tracing::info!(?duration_secs, "{text}"),
			NoticeKind::Fail => tracing::warn!(?duration_secs, "{text}"),
		}
	}
}

/// A notice as received by [`CollectingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
	pub kind: NoticeKind,
	pub text: String,
	pub duration_secs: Option<u32>,
}

/// Keeps every notice it receives, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
	notices: RefCell<Vec<Notice>>,
}

impl CollectingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn notices(&self) -> Vec<Notice> {
		self.notices.borrow().clone()
	}

	pub fn clear(&self) {
		self.notices.borrow_mut().clear();
	}
}

impl Notifier for CollectingNotifier {
	fn notice(&self, kind: NoticeKind, text: &str, duration_secs: Option<u32>) {
		self.notices.borrow_mut().push(Notice {
			kind,
			text: text.to_string(),
			duration_secs,
		});
	}
}
