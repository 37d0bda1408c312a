use std::{collections::HashMap, io::{self, Write}, rc::Rc};

use log::{debug, trace};

use crate::{
    error::{RuntimeError, SillyError, SillyResult},
    interpreter::{execute, Flow},
    lexer::TokenStream,
    parser::{parse_statement, FunctionDecl, Statement},
    value::Value,
};

#[derive(Debug)]
struct ScopeFrame {
    // None until the first store after declaration
    bindings: HashMap<String, Option<Value>>,
    // Index of the lookup parent, always below this frame on the stack
    parent: Option<usize>,
}

/// Stack of scope frames. Lookup follows parent links from the top frame,
/// not the physical stack, so function frames cannot see their callers.
#[derive(Debug)]
pub struct MemorySpace {
    frames: Vec<ScopeFrame>,
}

impl Default for MemorySpace {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySpace {
    pub fn new() -> Self {
        let mut memory = Self { frames: Vec::new() };
        memory.begin_function_scope();
        memory
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn begin_nested_scope(&mut self) {
        let parent = self.frames.len().checked_sub(1);
        trace!("entering nested scope {} (parent {:?})", self.frames.len(), parent);
        self.frames.push(ScopeFrame { bindings: HashMap::new(), parent });
    }

    pub fn begin_function_scope(&mut self) {
        trace!("entering function scope {}", self.frames.len());
        self.frames.push(ScopeFrame { bindings: HashMap::new(), parent: None });
    }

    /// Pops the top frame. The global frame is never removed.
    pub fn end_current_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            trace!("left scope {}", self.frames.len());
        }
    }

    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.bindings.insert(name.to_owned(), None);
        }
    }

    fn find_frame(&self, name: &str) -> Option<usize> {
        let mut current = self.frames.len().checked_sub(1);
        while let Some(index) = current {
            let frame = &self.frames[index];
            if frame.bindings.contains_key(name) {
                return Some(index);
            }
            current = frame.parent;
        }
        None
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.find_frame(name).is_some()
    }

    pub fn store(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let index = self.find_frame(name)
            .ok_or_else(|| RuntimeError::UndeclaredVariable { name: name.to_owned() })?;
        self.frames[index].bindings.insert(name.to_owned(), Some(value));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<Value, RuntimeError> {
        let index = self.find_frame(name)
            .ok_or_else(|| RuntimeError::UndeclaredVariable { name: name.to_owned() })?;
        self.frames[index].bindings[name]
            .clone()
            .ok_or_else(|| RuntimeError::UnassignedVariable { name: name.to_owned() })
    }
}

/// Flat table of declared functions. Entries are never removed or replaced.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Rc<FunctionDecl>>,
}

impl FunctionRegistry {
    pub fn register(&mut self, declaration: Rc<FunctionDecl>) {
        debug!("registering function {}/{}", declaration.name, declaration.parameters.len());
        self.functions.insert(declaration.name.spelling().to_owned(), declaration);
    }

    pub fn get(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeKind {
    Nested,
    Function,
}

/// Everything a running program can touch: variables, functions and the
/// sink that print statements write to.
pub struct EvaluationContext<W = io::Stdout> {
    pub(crate) memory: MemorySpace,
    pub(crate) functions: FunctionRegistry,
    output: W,
}

impl EvaluationContext<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for EvaluationContext<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> EvaluationContext<W> {
    pub fn with_output(output: W) -> Self {
        Self { memory: MemorySpace::new(), functions: FunctionRegistry::default(), output }
    }

    pub fn memory(&self) -> &MemorySpace {
        &self.memory
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub(crate) fn print_line(&mut self, line: &str) -> SillyResult<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Runs `body` inside a fresh frame which is released whatever the outcome.
    pub(crate) fn in_scope<T>(&mut self, kind: ScopeKind, body: impl FnOnce(&mut Self) -> SillyResult<T>) -> SillyResult<T> {
        match kind {
            ScopeKind::Nested => self.memory.begin_nested_scope(),
            ScopeKind::Function => self.memory.begin_function_scope(),
        }
        let result = body(self);
        self.memory.end_current_scope();
        result
    }

    /// Executes one top-level statement.
    pub fn execute(&mut self, statement: &Statement) -> SillyResult<()> {
        match execute(statement, self)? {
            Flow::Completed => Ok(()),
            Flow::Returning(_) => Err(SillyError::ReturnOutsideFunction),
        }
    }

    /// Parses and executes every statement of `source` in order, carrying on
    /// after runtime errors. Parsing stops at the first syntax error, whose
    /// result is the last one returned.
    pub fn evaluate_str(&mut self, source: &str) -> Vec<SillyResult<()>> {
        let mut tokens = TokenStream::from_source(source);
        let mut results = vec![];

        loop {
            match tokens.has_next() {
                Ok(true) => {}
                Ok(false) => break,
                Err(error) => {
                    results.push(Err(error));
                    break;
                }
            }
            match parse_statement(&mut tokens) {
                Ok(statement) => results.push(self.execute(&statement)),
                Err(error) => {
                    results.push(Err(error));
                    break;
                }
            }
        }

        results
    }
}
