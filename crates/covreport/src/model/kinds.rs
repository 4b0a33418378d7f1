//! Coverage kind sets and the provider's coverage-type spellings.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Set of enabled coverage kinds
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CoverageKinds: u8 {
        /// Statement coverage
        const STATEMENT = 1;
        /// Branch coverage
        const BRANCH = 1 << 1;
        /// MC/DC (condition) coverage
        const MCDC = 1 << 2;
        /// Basis-path coverage
        const BASIS_PATH = 1 << 3;
        /// Function coverage
        const FUNCTION = 1 << 4;
        /// Function call coverage
        const FUNCTION_CALL = 1 << 5;
    }
}

/// Display names in report column order
const LABELS: [(CoverageKinds, &str); 6] = [
    (CoverageKinds::STATEMENT, "Statement"),
    (CoverageKinds::BRANCH, "Branch"),
    (CoverageKinds::MCDC, "MC/DC"),
    (CoverageKinds::BASIS_PATH, "Basis Paths"),
    (CoverageKinds::FUNCTION, "Function"),
    (CoverageKinds::FUNCTION_CALL, "Function Call"),
];

impl CoverageKinds {
    /// No coverage at all
    pub const NONE: Self = Self::empty();

    /// Parse the provider's coverage type, either its display text
    /// (`"Statement+MC/DC"`, `"Basis Paths"`) or its enum spelling
    /// (`STATEMENT_MCDC`, `FUNCTION_FUNCTION_CALL`).
    ///
    /// Returns `None` when nothing in the string names a known kind.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.eq_ignore_ascii_case("none") {
            return Some(Self::NONE);
        }

        let normalized = trimmed.to_ascii_uppercase().replace(['_', '-', '+', '/'], " ");
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let mut set = Self::NONE;
        let mut i = 0;
        while i < words.len() {
            match words[i] {
                "STATEMENT" | "STATEMENTS" => set |= Self::STATEMENT,
                "BRANCH" | "BRANCHES" => set |= Self::BRANCH,
                "MCDC" | "MC" => {
                    if words.get(i + 1) == Some(&"DC") {
                        i += 1;
                    }
                    set |= Self::MCDC;
                }
                "BASIS" | "BASISPATH" | "BASISPATHS" => {
                    if matches!(words.get(i + 1), Some(&"PATH" | &"PATHS")) {
                        i += 1;
                    }
                    set |= Self::BASIS_PATH;
                }
                "FUNCTION" => {
                    if matches!(words.get(i + 1), Some(&"CALL" | &"CALLS")) {
                        i += 1;
                        set |= Self::FUNCTION_CALL;
                    } else {
                        set |= Self::FUNCTION;
                    }
                }
                "FUNCTIONCALL" | "FUNCTIONCALLS" => set |= Self::FUNCTION_CALL,
                _ => {}
            }
            i += 1;
        }

        if set.is_empty() {
            None
        } else {
            Some(set)
        }
    }
}

impl fmt::Display for CoverageKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names: Vec<&str> = LABELS
            .iter()
            .filter(|(kind, _)| self.contains(*kind))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("+"))
    }
}
