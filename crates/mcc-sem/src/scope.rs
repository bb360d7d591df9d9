//! Scope stack and unique-name generation.
//!
//! Variable resolution pushes one frame per lexical scope. Each frame maps
//! a source name to the unique name minted for that declaration; lookups
//! walk the stack from the innermost frame outward.

use mcc_util::FxHashMap;

/// Mints unique names of the form `base.N` with a monotonic counter.
#[derive(Debug, Default)]
pub struct NameGenerator {
    counter: u32,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `base.N` for the next N.
    pub fn fresh(&mut self, base: &str) -> String {
        let name = format!("{}.{}", base, self.counter);
        self.counter += 1;
        name
    }
}

/// Outcome of declaring a name in the innermost scope.
pub enum Declared {
    /// Freshly declared; holds the unique name.
    Unique(String),
    /// The innermost frame already had this source name.
    Duplicate,
}

/// A stack of name-mapping frames, one per lexical scope.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<FxHashMap<String, String>>,
}

impl ScopeStack {
    /// Creates a stack with the function-body frame already pushed.
    pub fn new() -> Self {
        Self {
            frames: vec![FxHashMap::default()],
        }
    }

    /// Enters a nested scope.
    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    /// Leaves the innermost scope.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Declares `name` in the innermost frame, minting a unique name.
    ///
    /// Shadowing an outer scope's name is fine; a second declaration in the
    /// same frame is reported as [`Declared::Duplicate`] (the mapping is
    /// still updated so resolution can continue).
    pub fn declare(&mut self, name: &str, names: &mut NameGenerator) -> Declared {
        let unique = names.fresh(name);
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        let duplicate = frame.insert(name.to_string(), unique.clone()).is_some();
        if duplicate {
            Declared::Duplicate
        } else {
            Declared::Unique(unique)
        }
    }

    /// Resolves a source name to its unique name, innermost frame first.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_names_are_distinct() {
        let mut names = NameGenerator::new();
        assert_eq!(names.fresh("a"), "a.0");
        assert_eq!(names.fresh("a"), "a.1");
        assert_eq!(names.fresh("b"), "b.2");
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut names = NameGenerator::new();
        let mut scopes = ScopeStack::new();
        assert!(matches!(
            scopes.declare("x", &mut names),
            Declared::Unique(_)
        ));
        assert_eq!(scopes.lookup("x"), Some("x.0"));
        assert_eq!(scopes.lookup("y"), None);
    }

    #[test]
    fn test_duplicate_in_same_frame() {
        let mut names = NameGenerator::new();
        let mut scopes = ScopeStack::new();
        scopes.declare("x", &mut names);
        assert!(matches!(
            scopes.declare("x", &mut names),
            Declared::Duplicate
        ));
    }

    #[test]
    fn test_shadowing_in_inner_frame() {
        let mut names = NameGenerator::new();
        let mut scopes = ScopeStack::new();
        scopes.declare("x", &mut names);
        scopes.push();
        assert!(matches!(
            scopes.declare("x", &mut names),
            Declared::Unique(_)
        ));
        assert_eq!(scopes.lookup("x"), Some("x.1"));
        scopes.pop();
        assert_eq!(scopes.lookup("x"), Some("x.0"));
    }
}
