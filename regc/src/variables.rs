//! Declared variables and where their values live.

use crate::ast::DataType;
use crate::target::Register;

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Name, unique within its registry.
    pub identifier: String,
    /// Declared type.
    pub data_type: DataType,
    /// Register currently holding the value. `None` until a value is assigned.
    pub bound_register: Option<Register>,
}

impl Variable {
    /// A variable with no value yet.
    pub fn unbound(identifier: impl Into<String>, data_type: DataType) -> Self {
        Self {
            identifier: identifier.into(),
            data_type,
            bound_register: None,
        }
    }
}

/// Variables local to a lexical scope. Looked up before the global table.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    variables: Vec<Variable>,
}

impl Scope {
    /// An empty scope.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Flat table of every variable declared during one compilation.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    globals: Vec<Variable>,
}

impl VariableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find `identifier`, searching `scope` first when one is given.
    pub fn find<'a>(&'a self, identifier: &str, scope: Option<&'a Scope>) -> Option<&'a Variable> {
        scope
            .and_then(|scope| scope.variables.iter().find(|v| v.identifier == identifier))
            .or_else(|| self.globals.iter().find(|v| v.identifier == identifier))
    }

    /// Mutable variant of [`VariableRegistry::find`].
    pub fn find_mut<'a>(
        &'a mut self,
        identifier: &str,
        scope: Option<&'a mut Scope>,
    ) -> Option<&'a mut Variable> {
        if let Some(scope) = scope
            && let Some(variable) = scope.variables.iter_mut().find(|v| v.identifier == identifier)
        {
            return Some(variable);
        }
        self.globals.iter_mut().find(|v| v.identifier == identifier)
    }

    /// Add `variable` to `scope`, or to the global table when no scope is given.
    ///
    /// Uniqueness is the caller's job; see [`VariableRegistry::find`].
    pub fn add(&mut self, variable: Variable, scope: Option<&mut Scope>) {
        match scope {
            Some(scope) => scope.variables.push(variable),
            None => self.globals.push(variable),
        }
    }

    /// Global variables in declaration order.
    pub fn globals(&self) -> &[Variable] {
        &self.globals
    }

    /// Number of global variables.
    pub fn len(&self) -> usize {
        self.globals.len()
    }

    /// Whether no global variable has been declared.
    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}
