//! Structured output buffer for one compilation unit.
//!
//! Every backend renders through a `UnitBuilder` instead of bare string
//! concatenation. The builder owns two disciplines that used to be
//! re-implemented per backend: indentation, and "each name defined at most
//! once per unit".

use rustc_hash::FxHashSet;

/// Output buffer for a single emitted file.
pub struct UnitBuilder {
    indent: usize,
    output: String,
    defined: FxHashSet<String>,
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self {
            indent: 0,
            output: String::with_capacity(4096),
            defined: FxHashSet::default(),
        }
    }

    /// Increase indentation level.
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation level.
    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent called with zero indent");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write a string without indentation or newline.
    pub fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Write a line with indentation and trailing newline.
    pub fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    /// Write a line, indented one level deeper than the current level.
    pub fn line_deeper(&mut self, s: &str) {
        self.indent();
        self.line(s);
        self.dedent();
    }

    /// Claim a definition name. Returns true the first time a name is
    /// claimed in this unit; callers skip emission on false.
    pub fn claim(&mut self, name: &str) -> bool {
        self.defined.insert(name.to_string())
    }

    /// True if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Finish the unit, guaranteeing exactly one trailing newline.
    pub fn finish(mut self) -> String {
        while self.output.ends_with("\n\n") {
            self.output.pop();
        }
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output
    }
}

impl Default for UnitBuilder {
    fn default() -> Self {
        Self::new()
    }
}
