use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// One argument carried by a signal emission.
///
/// Widgets emit signals with whatever payload they define; listeners receive
/// the payload as a slice of `Arg` after the emitting object.
#[derive(Clone)]
pub enum Arg {
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	Path(PathBuf),
	/// Opaque payload for values without a dedicated variant.
	Opaque(Arc<dyn Any + Send + Sync>),
}

impl Arg {
	/// Wraps an arbitrary value as an opaque payload.
	pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
		Self::Opaque(Arc::new(value))
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(n) => Some(*n),
			Self::Int(n) => Some(*n as f64),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_path(&self) -> Option<&std::path::Path> {
		match self {
			Self::Path(p) => Some(p),
			_ => None,
		}
	}

	/// Returns the opaque payload if it holds a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Opaque(value) => value.downcast_ref(),
			_ => None,
		}
	}
}

impl fmt::Debug for Arg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(n) => write!(f, "{n}"),
			Self::Float(n) => write!(f, "{n}"),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::Path(p) => write!(f, "{}", p.display()),
			Self::Opaque(_) => f.write_str("<opaque>"),
		}
	}
}

impl From<bool> for Arg {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<i64> for Arg {
	fn from(n: i64) -> Self {
		Self::Int(n)
	}
}

impl From<i32> for Arg {
	fn from(n: i32) -> Self {
		Self::Int(n.into())
	}
}

/// Counts beyond `i64::MAX` saturate.
impl From<usize> for Arg {
	fn from(n: usize) -> Self {
		Self::Int(i64::try_from(n).unwrap_or(i64::MAX))
	}
}

impl From<f64> for Arg {
	fn from(n: f64) -> Self {
		Self::Float(n)
	}
}

impl From<&str> for Arg {
	fn from(s: &str) -> Self {
		Self::Str(Arc::from(s))
	}
}

impl From<String> for Arg {
	fn from(s: String) -> Self {
		Self::Str(Arc::from(s))
	}
}

impl From<PathBuf> for Arg {
	fn from(p: PathBuf) -> Self {
		Self::Path(p)
	}
}

impl From<&std::path::Path> for Arg {
	fn from(p: &std::path::Path) -> Self {
		Self::Path(p.to_path_buf())
	}
}
