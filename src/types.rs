/// Operator joining two adjacent stages.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Connector {
	/// `|`: the left stage's output feeds the right stage's input.
	Pipe,
	/// `&&`: the right stage runs after the left one, unconditionally.
	Sequential,
}

impl Connector {
	pub fn from_token(token: &[u8]) -> Option<Connector> {
		match token {
			b"|" => Some(Connector::Pipe),
			b"&&" => Some(Connector::Sequential),
			_ => None,
		}
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RedirectMode { Truncate, Append }

#[derive(Debug, PartialEq, Eq, Default)]
pub struct Redirects<'a> {
	pub input: Option<&'a [u8]>,
	pub output: Option<(&'a [u8], RedirectMode)>,
}

impl<'a> Redirects<'a> {
	pub fn is_empty(&self) -> bool {
		self.input.is_none() && self.output.is_none()
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct Stage<'a> {
	/// Program name followed by its arguments; never empty.
	pub argv: Vec<&'a [u8]>,
	pub redirects: Redirects<'a>,
	pub background: bool,
}

impl<'a> Stage<'a> {
	pub fn program(&self) -> &'a [u8] {
		self.argv[0]
	}

	pub fn label(&self) -> String {
		String::from_utf8_lossy(self.program()).into_owned()
	}
}

/// Stages of one line; `connectors[i]` sits between `stages[i]` and `stages[i + 1]`.
#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline<'a> {
	pub stages: Vec<Stage<'a>>,
	pub connectors: Vec<Connector>,
}

impl<'a> Pipeline<'a> {
	/// Connector following stage `i`, `None` for the last stage.
	pub fn connector_after(&self, i: usize) -> Option<Connector> {
		self.connectors.get(i).copied()
	}
}

#[derive(Debug, PartialEq, Eq)]
pub struct Tokens<'a> {
	pub words: Vec<&'a [u8]>,
	pub connectors: usize,
}
