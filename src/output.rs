//! TICKscript serialization of a parsed program.
//!
//! The printer writes programs back in the conventional layout: `dbrp`
//! lines first, one statement per paragraph, pipelines broken one call per
//! line. Comments are written above the declaration, statement or call
//! they were attached to.
//!
//! # Examples
//!
//! ```
//! use tick_lang::parser::parse;
//! use tick_lang::output::format_program;
//!
//! let program = parse("stream|from().measurement('cpu')").unwrap();
//! assert_eq!(
//!     format_program(&program),
//!     "stream\n    |from()\n        .measurement('cpu')\n"
//! );
//! ```
//!
//! Binary expressions are wrapped in parentheses where the source had them,
//! and lambda operands always are, so output of the printer parses back to an
//! equal tree.

use crate::ast::{
    BinaryNode, Binding, ChainNode, FunctionKind, FunctionNode, Node, Program, Statement,
};
use crate::lexer::Comment;
use crate::literal::{format_duration, quote_reference, quote_regex, quote_string, NumberValue};

pub struct TickPrinter {
    indent_width: usize,
}

impl Default for TickPrinter {
    fn default() -> Self {
        TickPrinter::new(4)
    }
}

impl TickPrinter {
    pub fn new(indent_width: usize) -> Self {
        TickPrinter { indent_width }
    }

    pub fn print(&self, program: &Program) -> String {
        let mut out = String::new();

        for dbrp in &program.dbrps {
            self.print_comment(&mut out, dbrp.meta.comment.as_ref(), 0);
            out.push_str(&format!(
                "dbrp {}.{}\n",
                quote_reference(&dbrp.database),
                quote_reference(&dbrp.retention_policy)
            ));
        }

        for (i, statement) in program.statements.iter().enumerate() {
            if i > 0 || !program.dbrps.is_empty() {
                out.push('\n');
            }
            self.print_statement(&mut out, statement);
            out.push('\n');
        }

        if let Some(comment) = &program.trailing_comment {
            if !out.is_empty() {
                out.push('\n');
            }
            self.print_comment(&mut out, Some(comment), 0);
        }
        out
    }

    fn print_statement(&self, out: &mut String, statement: &Statement) {
        self.print_comment(out, statement.meta().comment.as_ref(), 0);
        match statement {
            Statement::Declaration(decl) => {
                out.push_str("var ");
                out.push_str(&decl.name.name);
                match &decl.binding {
                    Binding::Value(node) => {
                        out.push_str(" = ");
                        out.push_str(&self.print_node(node, 0));
                    }
                    Binding::Template(ty) => {
                        out.push(' ');
                        out.push_str(ty.name());
                    }
                }
            }
            Statement::Expression(node) => out.push_str(&self.print_node(node, 0)),
        }
    }

    fn print_node(&self, node: &Node, indent: usize) -> String {
        match node {
            Node::Number(n) => match n.value {
                NumberValue::Int(i) => i.to_string(),
                NumberValue::Float(f) => {
                    let text = f.to_string();
                    if text.contains('.') { text } else { format!("{text}.0") }
                }
            },
            Node::String(s) if s.triple_quoted => format!("'''{}'''", s.value),
            Node::String(s) => quote_string(&s.value),
            Node::Duration(d) => format_duration(d.value),
            Node::Regex(r) => quote_regex(r.regex.as_str()),
            Node::Bool(b) => String::from(if b.value { "TRUE" } else { "FALSE" }),
            Node::Star(_) => "*".to_string(),
            Node::List(list) => format!("[{}]", self.print_args(&list.elements, indent)),
            Node::Identifier(ident) => ident.name.clone(),
            Node::Reference(reference) => quote_reference(&reference.name),
            Node::Lambda(lambda) => format!("lambda: {}", self.print_node(&lambda.expression, indent)),
            Node::Unary(unary) => {
                format!("{}{}", unary.op, self.print_operand(&unary.operand, indent, |_| true))
            }
            Node::Binary(binary) => self.print_binary(binary, indent),
            Node::Function(function) => self.print_call(function, indent),
            Node::Chain(chain) => self.print_chain(chain, indent),
        }
    }

    fn print_binary(&self, binary: &BinaryNode, indent: usize) -> String {
        let precedence = binary.op.precedence();
        let left = self.print_operand(&binary.left, indent, |p| p < precedence);
        let right = self.print_operand(&binary.right, indent, |p| p <= precedence);
        let text = format!("{} {} {}", left, binary.op, right);
        if binary.parenthesized {
            format!("({text})")
        } else {
            text
        }
    }

    /// Operands that would otherwise regroup on reparse get parentheses. A
    /// lambda body extends as far right as possible, so a lambda operand is
    /// always wrapped.
    fn print_operand(&self, node: &Node, indent: usize, needs_parens: impl Fn(u8) -> bool) -> String {
        let text = self.print_node(node, indent);
        match node {
            Node::Binary(child) if !child.parenthesized && needs_parens(child.op.precedence()) => {
                format!("({text})")
            }
            Node::Lambda(_) => format!("({text})"),
            _ => text,
        }
    }

    fn print_chain(&self, chain: &ChainNode, indent: usize) -> String {
        let mut out = chain.source.name.clone();
        for call in &chain.calls {
            let depth = match call.kind {
                FunctionKind::Property => indent + 2,
                _ => indent + 1,
            };
            out.push('\n');
            self.print_comment(&mut out, call.meta.comment.as_ref(), depth);
            out.push_str(&self.indent(depth));
            out.push_str(&self.print_call(call, depth));
        }
        out
    }

    fn print_call(&self, call: &FunctionNode, indent: usize) -> String {
        format!(
            "{}{}({})",
            call.kind.prefix(),
            call.name,
            self.print_args(&call.args, indent)
        )
    }

    fn print_args(&self, args: &[Node], indent: usize) -> String {
        args.iter()
            .map(|arg| self.print_node(arg, indent))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_comment(&self, out: &mut String, comment: Option<&Comment>, indent: usize) {
        let Some(comment) = comment else { return };
        for line in &comment.lines {
            out.push_str(&self.indent(indent));
            if line.is_empty() {
                out.push_str("//\n");
            } else {
                out.push_str(&format!("// {line}\n"));
            }
        }
    }

    fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Formats a program with the default 4-space indentation.
pub fn format_program(program: &Program) -> String {
    TickPrinter::default().print(program)
}
