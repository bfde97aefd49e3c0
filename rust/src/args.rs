use crate::input::InputKind;

/// Arguments handed to the child, either as one line or already split.
///
/// `Line` is split on single spaces with no quoting or escaping support, so
/// an argument that itself contains a space must be passed through `List`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentSpec {
    Line(String),
    List(Vec<String>),
}

impl Default for ArgumentSpec {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ArgumentSpec {
    pub fn normalize(self) -> Vec<String> {
        match self {
            Self::Line(line) if line.is_empty() => Vec::new(),
            Self::Line(line) => line.split(' ').map(str::to_string).collect(),
            Self::List(list) => list,
        }
    }
}

impl From<&str> for ArgumentSpec {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for ArgumentSpec {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

impl From<Vec<String>> for ArgumentSpec {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

impl From<Vec<&str>> for ArgumentSpec {
    fn from(list: Vec<&str>) -> Self {
        Self::List(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ArgumentSpec {
    fn from(list: &[&str]) -> Self {
        Self::List(list.iter().map(|arg| arg.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ArgumentSpec {
    fn from(list: [&str; N]) -> Self {
        Self::List(list.iter().map(|arg| arg.to_string()).collect())
    }
}

/// Normalizes `spec` and prepends `input` when it names a file or address.
pub fn resolve_arguments(input: &str, kind: InputKind, spec: ArgumentSpec) -> Vec<String> {
    let mut args = spec.normalize();
    if !input.is_empty() && kind.is_reference() {
        args.insert(0, input.to_string());
    }
    args
}
