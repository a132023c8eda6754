use std::fmt;

use super::Expr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    Int,
    Float,
    Boolean,
    Char,
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "String",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub base: PrimitiveType,
    pub array: bool,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, if self.array { "[]" } else { "" })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TranslationUnit(pub Vec<ExternalDeclaration>);

#[derive(Clone, Debug, PartialEq)]
pub enum ExternalDeclaration {
    Class(ClassDecl),
    Method(MethodDecl),
    Declaration(Declaration),
    Stmt(Stmt),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<ClassMember>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClassMember {
    Field(Declaration),
    Method(MethodDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    /// `None` for `void`.
    pub return_type: Option<TypeName>,
    pub name: String,
    pub params: Vec<Param>,
    pub body: CompoundStmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Initializer>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    /// C-style `int a[N]`.
    ArraySize(usize),
    /// `int[] a = [e1, e2]`
    Elements(Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Compound(CompoundStmt),

    If(Expr, CompoundStmt, Option<CompoundStmt>),

    While(Expr, CompoundStmt),
    DoWhile(CompoundStmt, Expr),
    For(Option<ForInit>, Option<Expr>, Option<Expr>, CompoundStmt),

    Continue,
    Break,
    Return(Option<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForInit {
    Declaration(Declaration),
    Expr(Expr),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompoundStmt(pub Vec<DeclarationOrStmt>);

#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationOrStmt {
    Declaration(Declaration),
    Stmt(Stmt),
}
