use std::collections::HashMap;

use log::trace;

use super::{SemanticErrorKind, Ty};

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Element type for arrays.
    pub ty: Ty,
    pub line: usize,
    pub is_array: bool,
    pub array_size: usize,
    pub initialized: bool,
}

impl Symbol {
    pub fn full_type(&self) -> Ty {
        if self.is_array {
            Ty::Array(Box::new(self.ty.clone()))
        } else {
            self.ty.clone()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Scope {
    pub name: String,
    pub parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

/// Scope tree stored as an arena. Scopes are never freed, so a closed scope
/// can still be inspected through its [`ScopeId`].
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: "global".to_string(),
                parent: None,
                symbols: HashMap::new(),
            }],
            current: ScopeId(0),
        }
    }

    pub fn enter_scope(&mut self, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let scope = Scope {
            name: name.into(),
            parent: Some(self.current),
            symbols: HashMap::new(),
        };
        trace!("enter scope {} ({:?})", scope.name, id);
        self.scopes.push(scope);
        self.current = id;
        id
    }

    /// Returns to the parent scope. The global scope is never left.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.current_scope().parent {
            trace!("exit scope {}", self.current_scope().name);
            self.current = parent;
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn current_scope(&self) -> &Scope {
        self.scope(self.current)
    }

    pub fn declare_variable(&mut self, name: &str, ty: Ty, line: usize) -> Result<(), SemanticErrorKind> {
        self.declare(Symbol {
            name: name.to_string(),
            ty,
            line,
            is_array: false,
            array_size: 0,
            initialized: false,
        })
    }

    pub fn declare_array(
        &mut self,
        name: &str,
        element: Ty,
        size: usize,
        line: usize,
    ) -> Result<(), SemanticErrorKind> {
        self.declare(Symbol {
            name: name.to_string(),
            ty: element,
            line,
            is_array: true,
            array_size: size,
            initialized: false,
        })
    }

    fn declare(&mut self, symbol: Symbol) -> Result<(), SemanticErrorKind> {
        let scope = &mut self.scopes[self.current.0];
        if let Some(existing) = scope.symbols.get(&symbol.name) {
            return Err(SemanticErrorKind::AlreadyDeclared {
                name: symbol.name.clone(),
                first_line: existing.line,
            });
        }
        trace!("declare {} in {}", symbol.name, scope.name);
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<ScopeId> {
        let mut id = Some(self.current);
        while let Some(scope_id) = id {
            let scope = self.scope(scope_id);
            if scope.symbols.contains_key(name) {
                return Some(scope_id);
            }
            id = scope.parent;
        }
        None
    }

    /// Innermost visible symbol with this name.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let id = self.resolve(name)?;
        self.scope(id).get(name)
    }

    pub fn mark_initialized(&mut self, name: &str) -> bool {
        let Some(id) = self.resolve(name) else {
            return false;
        };
        match self.scopes[id.0].symbols.get_mut(name) {
            Some(symbol) => {
                symbol.initialized = true;
                true
            }
            None => false,
        }
    }
}
