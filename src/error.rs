/// Misuse errors reported synchronously at the call site.
///
/// Failures inside reactions or derivation functions are not represented
/// here: they unwind through the write that triggered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("a reaction must watch at least one observable")]
	NoObservables,

	#[error("a bound value cannot be set")]
	Bound,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
