use std::collections::HashMap;

use log::debug;

use crate::parser::{
    BinOpKind, ClassMember, CompoundStmt, Declaration, DeclarationOrStmt, Expr,
    ExternalDeclaration, ForInit, Initializer, Literal, MethodDecl, Stmt, TranslationUnit,
    UnaryOp,
};

use super::{Instr, Label, Operand, Place, UnaryOperator};

/// Only the body of this method is lowered; other methods are never called.
const ENTRY_POINT: &str = "main";

/// Jump targets of the innermost loops. `None` until a `break` or `continue`
/// needs the label.
#[derive(Debug, Default)]
struct LoopLabels {
    break_label: Option<Label>,
    continue_label: Option<Label>,
}

/// Lowers a [`TranslationUnit`] to three-address code.
///
/// Temporaries and labels are numbered from zero for every generator, so
/// generating the same program twice yields identical code.
///
/// A declaration that shadows a variable of an enclosing block is renamed to
/// `name$N`. `$` never appears in source identifiers.
#[derive(Debug, Default)]
pub struct CodeGenerator {
    code: Vec<Instr>,
    temp_index: usize,
    label_index: usize,
    loops: Vec<LoopLabels>,
    /// Source name to lowered name, innermost block last.
    scopes: Vec<HashMap<String, String>>,
    shadow_index: HashMap<String, usize>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, translation_unit: &TranslationUnit) -> Vec<Instr> {
        self.gen_translation_unit(translation_unit);
        debug!(
            "generated {} instructions, {} temporaries, {} labels",
            self.code.len(),
            self.temp_index,
            self.label_index
        );
        self.code
    }

    fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    fn new_temp(&mut self) -> Place {
        let temp = Place::Temp(self.temp_index);
        self.temp_index += 1;
        temp
    }

    fn new_label(&mut self) -> Label {
        let label = Label(self.label_index);
        self.label_index += 1;
        label
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn resolve(&self, name: &str) -> String {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn declare(&mut self, name: &str) -> Place {
        if self.scopes.is_empty() {
            self.enter_scope();
        }
        let depth = self.scopes.len() - 1;
        if let Some(lowered) = self.scopes[depth].get(name) {
            return Place::Var(lowered.clone());
        }

        let shadows = self.scopes[..depth]
            .iter()
            .any(|scope| scope.contains_key(name));
        let lowered = if shadows {
            let index = self.shadow_index.entry(name.to_string()).or_default();
            *index += 1;
            format!("{}${}", name, index)
        } else {
            name.to_string()
        };
        self.scopes[depth].insert(name.to_string(), lowered.clone());
        Place::Var(lowered)
    }

    fn gen_translation_unit(&mut self, translation_unit: &TranslationUnit) {
        self.enter_scope();
        for external_declaration in &translation_unit.0 {
            match external_declaration {
                ExternalDeclaration::Class(class) => {
                    self.enter_scope();
                    for member in &class.members {
                        if let ClassMember::Field(declaration) = member {
                            self.gen_declaration(declaration);
                        }
                    }
                    for member in &class.members {
                        if let ClassMember::Method(method) = member {
                            self.gen_method(method);
                        }
                    }
                    self.exit_scope();
                }
                ExternalDeclaration::Method(method) => self.gen_method(method),
                ExternalDeclaration::Declaration(declaration) => self.gen_declaration(declaration),
                ExternalDeclaration::Stmt(stmt) => self.gen_stmt(stmt),
            }
        }
        self.exit_scope();
    }

    fn gen_method(&mut self, method: &MethodDecl) {
        if method.name == ENTRY_POINT {
            self.gen_compound_stmt(&method.body);
        }
    }

    fn gen_declaration(&mut self, declaration: &Declaration) {
        // The initializer still sees the enclosing binding of the name.
        if let Some(Initializer::Expr(expr)) = &declaration.init {
            let src = self.gen_expr(expr);
            let dest = self.declare(&declaration.name);
            self.emit(Instr::Copy { dest, src });
            return;
        }

        let dest = self.declare(&declaration.name);
        match &declaration.init {
            None | Some(Initializer::Expr(_)) => {}
            Some(Initializer::ArraySize(size)) => {
                self.emit(Instr::NewArray { dest, size: *size });
            }
            Some(Initializer::Elements(elements)) => {
                self.emit(Instr::NewArray {
                    dest: dest.clone(),
                    size: elements.len(),
                });
                for (i, element) in elements.iter().enumerate() {
                    let value = self.gen_expr(element);
                    self.emit(Instr::IndexStore {
                        array: dest.clone(),
                        index: Operand::Literal(Literal::Int(i as i64)),
                        value,
                    });
                }
            }
        }
    }

    fn gen_compound_stmt(&mut self, compound_stmt: &CompoundStmt) {
        self.enter_scope();
        for item in &compound_stmt.0 {
            match item {
                DeclarationOrStmt::Declaration(declaration) => self.gen_declaration(declaration),
                DeclarationOrStmt::Stmt(stmt) => self.gen_stmt(stmt),
            }
        }
        self.exit_scope();
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.gen_expr(expr);
            }
            Stmt::Compound(compound_stmt) => self.gen_compound_stmt(compound_stmt),
            Stmt::If(cond, then, otherwise) => self.gen_if(cond, then, otherwise.as_ref()),
            Stmt::While(cond, body) => self.gen_while(cond, body),
            Stmt::DoWhile(body, cond) => self.gen_do_while(body, cond),
            Stmt::For(init, cond, step, body) => {
                self.gen_for(init.as_ref(), cond.as_ref(), step.as_ref(), body)
            }
            Stmt::Break => {
                if let Some(label) = self.jump_target(|labels| &mut labels.break_label) {
                    self.emit(Instr::Goto(label));
                }
            }
            Stmt::Continue => {
                if let Some(label) = self.jump_target(|labels| &mut labels.continue_label) {
                    self.emit(Instr::Goto(label));
                }
            }
            Stmt::Return(value) => {
                let value = value.as_ref().map(|expr| self.gen_expr(expr));
                self.emit(Instr::Return(value));
            }
        }
    }

    /// Label of the innermost loop selected by `slot`, allocated on first use.
    /// `None` outside of any loop.
    fn jump_target(&mut self, slot: fn(&mut LoopLabels) -> &mut Option<Label>) -> Option<Label> {
        let depth = self.loops.len().checked_sub(1)?;
        if let Some(label) = *slot(&mut self.loops[depth]) {
            return Some(label);
        }
        let label = self.new_label();
        *slot(&mut self.loops[depth]) = Some(label);
        Some(label)
    }

    fn gen_if(&mut self, cond: &Expr, then: &CompoundStmt, otherwise: Option<&CompoundStmt>) {
        let cond = self.gen_expr(cond);
        match otherwise {
            None => {
                let end = self.new_label();
                self.emit(Instr::IfFalse { cond, target: end });
                self.gen_compound_stmt(then);
                self.emit(Instr::Label(end));
            }
            Some(otherwise) => {
                let else_label = self.new_label();
                let end = self.new_label();
                self.emit(Instr::IfFalse {
                    cond,
                    target: else_label,
                });
                self.gen_compound_stmt(then);
                self.emit(Instr::Goto(end));
                self.emit(Instr::Label(else_label));
                self.gen_compound_stmt(otherwise);
                self.emit(Instr::Label(end));
            }
        }
    }

    fn gen_while(&mut self, cond: &Expr, body: &CompoundStmt) {
        let start = self.new_label();
        let end = self.new_label();

        self.emit(Instr::Label(start));
        let cond = self.gen_expr(cond);
        self.emit(Instr::IfFalse { cond, target: end });

        self.loops.push(LoopLabels {
            break_label: Some(end),
            continue_label: Some(start),
        });
        self.gen_compound_stmt(body);
        self.loops.pop();

        self.emit(Instr::Goto(start));
        self.emit(Instr::Label(end));
    }

    fn gen_do_while(&mut self, body: &CompoundStmt, cond: &Expr) {
        let start = self.new_label();
        self.emit(Instr::Label(start));

        self.loops.push(LoopLabels::default());
        self.gen_compound_stmt(body);
        let labels = self.loops.pop().unwrap_or_default();

        if let Some(label) = labels.continue_label {
            self.emit(Instr::Label(label));
        }
        let cond = self.gen_expr(cond);
        self.emit(Instr::IfTrue {
            cond,
            target: start,
        });
        if let Some(label) = labels.break_label {
            self.emit(Instr::Label(label));
        }
    }

    fn gen_for(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &CompoundStmt,
    ) {
        self.enter_scope();
        match init {
            Some(ForInit::Declaration(declaration)) => self.gen_declaration(declaration),
            Some(ForInit::Expr(expr)) => {
                self.gen_expr(expr);
            }
            None => {}
        }

        let start = self.new_label();
        let end = self.new_label();
        self.emit(Instr::Label(start));
        if let Some(cond) = cond {
            let cond = self.gen_expr(cond);
            self.emit(Instr::IfFalse { cond, target: end });
        }

        self.loops.push(LoopLabels {
            break_label: Some(end),
            continue_label: None,
        });
        self.gen_compound_stmt(body);
        let labels = self.loops.pop().unwrap_or_default();

        if let Some(label) = labels.continue_label {
            self.emit(Instr::Label(label));
        }
        if let Some(step) = step {
            self.gen_expr(step);
        }
        self.emit(Instr::Goto(start));
        self.emit(Instr::Label(end));
        self.exit_scope();
    }

    /// Lowers `expr` and returns the operand holding its value.
    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Literal(literal) => Operand::Literal(literal.clone()),
            Expr::Ident(name) => Operand::Var(self.resolve(name)),
            Expr::Grouped(inner) => self.gen_expr(inner),
            Expr::Assign(name, value) => {
                let src = self.gen_expr(value);
                let dest = Place::Var(self.resolve(name));
                self.emit(Instr::Copy {
                    dest: dest.clone(),
                    src,
                });
                dest.into()
            }
            Expr::IndexAssign(array, index, value) => {
                let array = self.gen_place(array);
                let index = self.gen_expr(index);
                let value = self.gen_expr(value);
                self.emit(Instr::IndexStore {
                    array,
                    index,
                    value: value.clone(),
                });
                value
            }
            Expr::IndexUpdate(op, array, index, value) => {
                let array = self.gen_place(array);
                let index = self.gen_expr(index);
                let old = self.new_temp();
                self.emit(Instr::IndexLoad {
                    dest: old.clone(),
                    array: array.clone(),
                    index: index.clone(),
                });
                let rhs = self.gen_expr(value);
                let new = self.new_temp();
                self.emit(Instr::Binary {
                    dest: new.clone(),
                    op: *op,
                    lhs: old.into(),
                    rhs,
                });
                self.emit(Instr::IndexStore {
                    array,
                    index,
                    value: new.clone().into(),
                });
                new.into()
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.gen_expr(lhs);
                let rhs = self.gen_expr(rhs);
                let dest = self.new_temp();
                self.emit(Instr::Binary {
                    dest: dest.clone(),
                    op: *op,
                    lhs,
                    rhs,
                });
                dest.into()
            }
            Expr::Unary(op, operand) => self.gen_unary(*op, operand),
            Expr::Call(name, args) => {
                let args: Vec<Operand> = args.iter().map(|arg| self.gen_expr(arg)).collect();
                if !args.is_empty() {
                    self.emit(Instr::Param(args));
                }
                let dest = self.new_temp();
                self.emit(Instr::Call {
                    dest: dest.clone(),
                    name: name.clone(),
                });
                dest.into()
            }
            Expr::Index(array, index) => {
                let array = self.gen_place(array);
                let index = self.gen_expr(index);
                let dest = self.new_temp();
                self.emit(Instr::IndexLoad {
                    dest: dest.clone(),
                    array,
                    index,
                });
                dest.into()
            }
            // Member access has no runtime representation.
            Expr::Field(..) => Operand::Literal(Literal::Int(0)),
        }
    }

    fn gen_place(&mut self, expr: &Expr) -> Place {
        match self.gen_expr(expr) {
            Operand::Temp(index) => Place::Temp(index),
            Operand::Var(name) => Place::Var(name),
            literal @ Operand::Literal(_) => {
                let dest = self.new_temp();
                self.emit(Instr::Copy {
                    dest: dest.clone(),
                    src: literal,
                });
                dest
            }
        }
    }

    fn gen_unary(&mut self, op: UnaryOp, operand: &Expr) -> Operand {
        let (delta, is_postfix) = match op {
            UnaryOp::Neg | UnaryOp::LogicalNot => {
                let operand = self.gen_expr(operand);
                let dest = self.new_temp();
                let op = if op == UnaryOp::Neg {
                    UnaryOperator::Neg
                } else {
                    UnaryOperator::Not
                };
                self.emit(Instr::Unary {
                    dest: dest.clone(),
                    op,
                    operand,
                });
                return dest.into();
            }
            UnaryOp::PrefixIncrement => (BinOpKind::Add, false),
            UnaryOp::PrefixDecrement => (BinOpKind::Sub, false),
            UnaryOp::PostfixIncrement => (BinOpKind::Add, true),
            UnaryOp::PostfixDecrement => (BinOpKind::Sub, true),
        };
        let one = Operand::Literal(Literal::Int(1));

        match operand {
            Expr::Ident(name) => {
                let var = Place::Var(self.resolve(name));
                let snapshot = if is_postfix {
                    let temp = self.new_temp();
                    self.emit(Instr::Copy {
                        dest: temp.clone(),
                        src: var.clone().into(),
                    });
                    Some(temp)
                } else {
                    None
                };
                self.emit(Instr::Binary {
                    dest: var.clone(),
                    op: delta,
                    lhs: var.clone().into(),
                    rhs: one,
                });
                snapshot.unwrap_or(var).into()
            }
            Expr::Index(array, index) => {
                let array = self.gen_place(array);
                let index = self.gen_expr(index);
                let old = self.new_temp();
                self.emit(Instr::IndexLoad {
                    dest: old.clone(),
                    array: array.clone(),
                    index: index.clone(),
                });
                let new = self.new_temp();
                self.emit(Instr::Binary {
                    dest: new.clone(),
                    op: delta,
                    lhs: old.clone().into(),
                    rhs: one,
                });
                self.emit(Instr::IndexStore {
                    array,
                    index,
                    value: new.clone().into(),
                });
                Operand::from(if is_postfix { old } else { new })
            }
            _ => {
                let value = self.gen_expr(operand);
                if is_postfix {
                    return value;
                }
                let dest = self.new_temp();
                self.emit(Instr::Binary {
                    dest: dest.clone(),
                    op: delta,
                    lhs: value,
                    rhs: one,
                });
                dest.into()
            }
        }
    }
}
