use crate::node::ComponentId;
use core::fmt::{self, Display, Formatter};

/// Location of a value inside a diff or tree, used in error messages.
///
/// Displays like `c.3.0.d[1][2]`: component `3`, its slot `0`, the comprehension's second tuple, third value.
/// The root node displays as `<root>`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
	Slot(usize),
	Component(ComponentId),
	Index(usize),
	Key(String),
}

impl Path {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, segment: Segment) {
		self.0.push(segment)
	}

	pub fn pop(&mut self) {
		self.0.pop();
	}

	#[must_use]
	pub fn depth(&self) -> usize {
		self.0.len()
	}
}

impl Display for Path {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("<root>");
		}

		for (i, segment) in self.0.iter().enumerate() {
			let separator = if i > 0 { "." } else { "" };
			match segment {
				Segment::Index(index) => write!(f, "[{}]", index)?,
				Segment::Slot(index) => write!(f, "{}{}", separator, index)?,
				Segment::Component(id) => write!(f, "{}c.{}", separator, id)?,
				Segment::Key(key) => write!(f, "{}{}", separator, key)?,
			}
		}
		Ok(())
	}
}
