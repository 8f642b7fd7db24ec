//! The fixed catalog of programs that can be critiqued.

use thiserror::Error;

/// Programs offered when no override is configured.
pub const DEFAULT_PROGRAMS: [&str; 4] = [
    "Love Island",
    "Turkish News",
    "Cooking Show",
    "Sports Highlights",
];

/// Why a catalog could not be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No program names were given.
    #[error("program catalog is empty")]
    Empty,

    /// The same program name appears twice.
    #[error("duplicate program name: {0}")]
    Duplicate(String),

    /// The name cannot be used as a directory under the assets root.
    #[error("program name is not a plain directory name: {0}")]
    UnsafeName(String),
}

/// An ordered, non-empty list of distinct program names. Selections refer to
/// programs by their index in this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramCatalog {
    programs: Vec<String>,
}

impl ProgramCatalog {
    /// Builds a catalog, trimming names and dropping blank ones.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if no names remain, a name repeats, or a name
    /// contains a path separator or is a `.`/`..` component.
    pub fn new<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut programs: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if !is_plain_name(name) {
                return Err(CatalogError::UnsafeName(name.to_owned()));
            }
            if programs.iter().any(|p| p == name) {
                return Err(CatalogError::Duplicate(name.to_owned()));
            }
            programs.push(name.to_owned());
        }
        if programs.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { programs })
    }

    /// Parses a comma-separated list such as the `TV_PROGRAMS` variable.
    ///
    /// # Errors
    ///
    /// See [`ProgramCatalog::new`].
    pub fn parse(list: &str) -> Result<Self, CatalogError> {
        Self::new(list.split(','))
    }

    /// The program at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.programs.get(index).map(String::as_str)
    }

    /// Whether `name` is a listed program.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.programs.iter().any(|p| p == name)
    }

    /// All program names in selection order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.programs
    }
}

/// Payloads are stored under a directory named after the program, so a name
/// must stay a single path component.
fn is_plain_name(name: &str) -> bool {
    !name.contains(['/', '\\', '\0']) && name != "." && name != ".."
}

impl Default for ProgramCatalog {
    fn default() -> Self {
        Self {
            programs: DEFAULT_PROGRAMS.iter().map(|&p| p.to_owned()).collect(),
        }
    }
}
