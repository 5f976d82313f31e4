//! Classification of decoded payloads against an expected shape.
//!
//! The error envelope always takes precedence: a payload that decodes as an
//! [`ErrorEnvelope`] is reported as [`Validation::ApiError`] even when it would also satisfy
//! the target schema. Mismatches keep the offending payload out of the returned data and record
//! it, together with its [`skeleton`] and key paths, in a bounded diagnostic log.

mod envelope;
mod schema;

pub mod skeleton;

pub use envelope::*;
pub use schema::*;

// self
use crate::{_prelude::*, client::RawPayload};

/// Default number of diagnostics retained by a [`ResponseValidator`].
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 32;

/// Tagged result of classifying one payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation<T> {
	/// Payload is a structured API error.
	ApiError(ErrorEnvelope),
	/// Payload matches neither the error envelope nor the target shape.
	Mismatch(DecodeError),
	/// Payload decoded into the target shape.
	Valid(T),
}
impl<T> Validation<T> {
	/// Returns `true` for [`Validation::Valid`].
	pub fn is_valid(&self) -> bool {
		matches!(self, Validation::Valid(_))
	}

	/// Returns the decoded value, discarding soft failures.
	pub fn valid(self) -> Option<T> {
		match self {
			Validation::Valid(value) => Some(value),
			_ => None,
		}
	}
}

/// Soft-failure category stored in a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
	/// The payload was an error envelope.
	ApiError,
	/// The payload did not fit the target shape.
	Mismatch,
}

/// Recorded soft failure.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
	/// Failure category.
	pub kind: DiagnosticKind,
	/// HTTP status the payload arrived with.
	pub status: u16,
	/// Envelope summary or decode reason.
	pub reason: String,
	/// Full offending payload.
	pub payload: Value,
	/// Type skeleton of the payload.
	pub skeleton: Value,
	/// Dotted key paths present in the payload.
	pub key_paths: BTreeSet<String>,
	/// Wall-clock time the failure was classified.
	pub observed_at: OffsetDateTime,
}

/// Classifies payloads and keeps the most recent soft failures for inspection.
#[derive(Debug)]
pub struct ResponseValidator {
	capacity: usize,
	diagnostics: Mutex<VecDeque<Diagnostic>>,
}
impl ResponseValidator {
	/// Creates a validator that retains up to `capacity` diagnostics.
	pub fn new(capacity: usize) -> Self {
		Self { capacity, diagnostics: Mutex::new(VecDeque::with_capacity(capacity)) }
	}

	/// Classifies `raw` against the error envelope first, then against `schema`.
	pub fn classify<S>(&self, raw: &RawPayload, schema: &S) -> Validation<S::Output>
	where
		S: ?Sized + Schema,
	{
		if let Ok(envelope) = ErrorEnvelope::decode(&raw.body) {
			let reason = envelope.summary();

			tracing::warn!(status = raw.status, %reason, "API returned an error envelope.");
			self.record(DiagnosticKind::ApiError, raw, reason);

			return Validation::ApiError(envelope);
		}

		match schema.decode(&raw.body) {
			Ok(value) => Validation::Valid(value),
			Err(err) => {
				tracing::warn!(
					status = raw.status,
					target = err.target,
					path = %err.path,
					"Response did not match the expected shape."
				);
				tracing::debug!(payload = %raw.body, "Mismatched payload.");
				self.record(DiagnosticKind::Mismatch, raw, err.to_string());

				Validation::Mismatch(err)
			},
		}
	}

	/// Snapshot of retained diagnostics, oldest first.
	pub fn recent_diagnostics(&self) -> Vec<Diagnostic> {
		self.diagnostics.lock().iter().cloned().collect()
	}

	fn record(&self, kind: DiagnosticKind, raw: &RawPayload, reason: String) {
		if self.capacity == 0 {
			return;
		}

		let diagnostic = Diagnostic {
			kind,
			status: raw.status,
			reason,
			payload: raw.body.clone(),
			skeleton: skeleton::skeleton(&raw.body),
			key_paths: skeleton::key_paths(&raw.body),
			observed_at: OffsetDateTime::now_utc(),
		};
		let mut diagnostics = self.diagnostics.lock();

		if diagnostics.len() == self.capacity {
			diagnostics.pop_front();
		}

		diagnostics.push_back(diagnostic);
	}
}
impl Default for ResponseValidator {
	fn default() -> Self {
		Self::new(DEFAULT_DIAGNOSTIC_CAPACITY)
	}
}
