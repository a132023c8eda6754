use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use log::{debug, trace, warn};

use crate::{
    codegen::{Instr, Label, Operand, Place},
    grammar::PRINTLN,
};

use super::{RuntimeError, Value, MAX_ARRAY_LEN};

/// Everything observable about one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionTrace {
    pub success: bool,
    pub output: Vec<String>,
    /// Final bindings of named variables, sorted by name.
    pub variables: BTreeMap<String, Value>,
    pub temporaries: BTreeMap<usize, Value>,
    pub instructions_executed: usize,
    pub return_value: Option<Value>,
}

/// Executes three-address code directly, with a fixed instruction budget.
#[derive(Debug)]
pub struct Interpreter<'a> {
    code: &'a [Instr],
    labels: HashMap<Label, usize>,
    variables: BTreeMap<String, Value>,
    temporaries: BTreeMap<usize, Value>,
    /// Arguments buffered by `param` for the next `call`.
    params: Vec<&'a Operand>,
    output: Vec<String>,
    pc: usize,
    executed: usize,
    max_instructions: usize,
    return_value: Option<Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(code: &'a [Instr], max_instructions: usize) -> Self {
        let labels = code
            .iter()
            .enumerate()
            .filter_map(|(i, instr)| match instr {
                Instr::Label(label) => Some((*label, i)),
                _ => None,
            })
            .collect();

        Self {
            code,
            labels,
            variables: BTreeMap::new(),
            temporaries: BTreeMap::new(),
            params: vec![],
            output: vec![],
            pc: 0,
            executed: 0,
            max_instructions,
            return_value: None,
        }
    }

    pub fn execute(mut self) -> ExecutionTrace {
        debug!("executing {} instructions", self.code.len());
        let success = match self.run() {
            Ok(()) => true,
            Err(e @ RuntimeError::InstructionLimit(_)) => {
                warn!("{}", e);
                self.output.push(e.to_string());
                false
            }
            Err(e) => {
                warn!("execution failed at instruction {}: {}", self.pc, e);
                self.output.push(format!("Execution error: {}", e));
                false
            }
        };
        debug!(
            "executed {} instructions, success: {}",
            self.executed, success
        );

        ExecutionTrace {
            success,
            output: self.output,
            variables: self.variables,
            temporaries: self.temporaries,
            instructions_executed: self.executed,
            return_value: self.return_value,
        }
    }

    fn run(&mut self) -> Result<(), RuntimeError> {
        let code = self.code;
        while let Some(instr) = code.get(self.pc) {
            self.pc += 1;
            if let Instr::Label(_) = instr {
                continue;
            }
            if self.executed >= self.max_instructions {
                return Err(RuntimeError::InstructionLimit(self.max_instructions));
            }
            self.executed += 1;
            trace!("{:4}: {}", self.pc, instr);
            self.step(instr)?;
        }
        Ok(())
    }

    fn step(&mut self, instr: &'a Instr) -> Result<(), RuntimeError> {
        match instr {
            Instr::Copy { dest, src } => {
                let value = self.read(src);
                self.write(dest, value);
            }
            Instr::Unary { dest, op, operand } => {
                let value = Value::unary(*op, &self.read(operand))?;
                self.write(dest, value);
            }
            Instr::Binary { dest, op, lhs, rhs } => {
                let value = Value::binary(*op, &self.read(lhs), &self.read(rhs))?;
                self.write(dest, value);
            }
            Instr::NewArray { dest, size } => {
                if *size > MAX_ARRAY_LEN {
                    return Err(RuntimeError::ArrayTooLarge(*size));
                }
                self.write(dest, Value::array(vec![Value::Int(0); *size]));
            }
            Instr::IndexLoad { dest, array, index } => {
                let index = self.read(index);
                let cells = self.array(array)?;
                let items = cells.borrow();
                let value = items[checked_index(&index, items.len())?].clone();
                self.write(dest, value);
            }
            Instr::IndexStore {
                array,
                index,
                value,
            } => {
                let index = self.read(index);
                let value = self.read(value);
                let cells = self.array(array)?;
                let mut items = cells.borrow_mut();
                let i = checked_index(&index, items.len())?;
                items[i] = value;
            }
            Instr::Label(_) => {}
            Instr::Goto(label) => self.jump(*label)?,
            Instr::IfFalse { cond, target } => {
                if !self.read(cond).is_truthy() {
                    self.jump(*target)?;
                }
            }
            Instr::IfTrue { cond, target } => {
                if self.read(cond).is_truthy() {
                    self.jump(*target)?;
                }
            }
            Instr::Param(args) => self.params = args.iter().collect(),
            Instr::Call { dest, name } => {
                let value = self.call(name);
                self.write(dest, value);
            }
            Instr::Return(value) => {
                if let Some(value) = value {
                    self.return_value = Some(self.read(value));
                }
                self.pc = self.code.len();
            }
        }
        Ok(())
    }

    /// `System.out.println` prints its arguments separated by spaces and
    /// yields nothing. Any other callee yields `0`.
    fn call(&mut self, name: &str) -> Value {
        let params = std::mem::take(&mut self.params);
        if name != PRINTLN {
            return Value::Int(0);
        }

        let line = params
            .into_iter()
            .map(|param| self.read(param).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.output.push(line);
        Value::Void
    }

    fn jump(&mut self, label: Label) -> Result<(), RuntimeError> {
        self.pc = *self
            .labels
            .get(&label)
            .ok_or(RuntimeError::UnknownLabel(label))?;
        Ok(())
    }

    fn array(&self, place: &Place) -> Result<Rc<RefCell<Vec<Value>>>, RuntimeError> {
        let bound = match place {
            Place::Temp(index) => self.temporaries.get(index),
            Place::Var(name) => self.variables.get(name),
        };
        match bound {
            Some(Value::Array(items)) => Ok(Rc::clone(items)),
            _ => Err(RuntimeError::NotAnArray(place.to_string())),
        }
    }

    /// Unbound names read as `0`.
    fn read(&self, operand: &Operand) -> Value {
        let bound = match operand {
            Operand::Literal(literal) => return Value::from(literal),
            Operand::Temp(index) => self.temporaries.get(index),
            Operand::Var(name) => self.variables.get(name),
        };
        bound.cloned().unwrap_or(Value::Int(0))
    }

    fn write(&mut self, place: &Place, value: Value) {
        match place {
            Place::Temp(index) => {
                self.temporaries.insert(*index, value);
            }
            Place::Var(name) => {
                self.variables.insert(name.clone(), value);
            }
        }
    }
}

fn checked_index(index: &Value, len: usize) -> Result<usize, RuntimeError> {
    let Value::Int(index) = *index else {
        return Err(RuntimeError::InvalidIndex(index.type_name()));
    };
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(RuntimeError::IndexOutOfBounds { index, len })
}
