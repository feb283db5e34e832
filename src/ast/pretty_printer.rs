//! Prints expression/statement in a pretty format

use crate::ast::{expr::*, stmt::*};
use ::itertools::Itertools;
use ::std::fmt::Write;

pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

// *****************************
// ***** Pretty print Stmt *****
// *****************************

impl PrettyPrint for Program {
    fn pretty_print(&self) -> String {
        let mut s = String::new();
        self::write_stmts(&mut s, 0, &self.stmts);
        s
    }
}

impl PrettyPrint for Stmt {
    fn pretty_print(&self) -> String {
        let mut s = String::new();
        self::write_stmt(&mut s, 0, self);
        s
    }
}

/// Dispatches a sub function to pretty write a `Stmt`
fn write_stmt(s: &mut String, indent: usize, stmt: &Stmt) {
    use Stmt::*;
    match *stmt {
        Expr(ref expr) => write!(s, "(eval {})", expr.pretty_print()).unwrap(),
        Print(ref print) => write!(s, "(print {})", print.expr.pretty_print()).unwrap(),
        Var(ref var) => write!(s, "(var {} {})", var.name, var.init.pretty_print()).unwrap(),
        If(ref if_) => self::write_if(s, indent, if_),
        While(ref while_) => {
            writeln!(s, "(while {}", while_.condition.pretty_print()).unwrap();
            self::write_indent(s, indent + 1);
            self::write_stmt(s, indent + 1, &while_.body);
            write!(s, ")").unwrap();
        }
        Block(ref block) => {
            write!(s, "(block ").unwrap();
            self::write_stmts(s, indent + 1, &block.stmts);
            write!(s, ")").unwrap();
        }
        Return(ref ret) => match ret.value {
            Some(ref expr) => write!(s, "(return {})", expr.pretty_print()).unwrap(),
            None => write!(s, "(return)").unwrap(),
        },
        Fn(ref f) => self::write_fn(s, indent, f),
        Class(ref c) => self::write_class(s, indent, c),
    }
}

fn write_indent(s: &mut String, indent: usize) {
    for _ in 0..indent {
        write!(s, "    ").unwrap();
    }
}

fn write_stmts(s: &mut String, indent: usize, stmts: &[Stmt]) {
    if let Some((last, init)) = stmts.split_last() {
        for stmt in init {
            self::write_stmt(s, indent, stmt);
            writeln!(s).unwrap();
            self::write_indent(s, indent);
        }
        self::write_stmt(s, indent, last);
    }
}

fn write_if(s: &mut String, indent: usize, if_: &IfArgs) {
    write!(s, "(if {} ", if_.condition.pretty_print()).unwrap();
    self::write_stmt(s, indent + 1, &if_.if_true);
    match if_.if_false {
        Some(ref else_) => {
            write!(s, " ").unwrap();
            self::write_stmt(s, indent + 1, else_);
        }
        None => {}
    }
    write!(s, ")").unwrap();
}

fn write_fn(s: &mut String, indent: usize, f: &FnDeclArgs) {
    writeln!(s, "(defn {} {}", f.name, self::pretty_vec(&f.params)).unwrap();
    self::write_indent(s, indent + 1);
    self::write_stmts(s, indent + 1, &f.body.stmts);
    write!(s, ")").unwrap();
}

fn write_class(s: &mut String, indent: usize, c: &ClassDeclArgs) {
    match c.base {
        Some(ref base) => write!(s, "(class {} < {}", c.name, base.name).unwrap(),
        None => write!(s, "(class {}", c.name).unwrap(),
    }
    for method in c.methods.iter() {
        writeln!(s).unwrap();
        self::write_indent(s, indent + 1);
        self::write_fn(s, indent + 1, method);
    }
    write!(s, ")").unwrap();
}

// *****************************
// ***** Pretty print Expr *****
// *****************************

fn pretty_vec(xs: impl IntoIterator<Item = impl ::std::fmt::Display>) -> String {
    format!("({})", xs.into_iter().join(", "))
}

impl PrettyPrint for Expr {
    fn pretty_print(&self) -> String {
        use Expr::*;
        match *self {
            Literal(ref l) => l.pretty_print(),
            Unary(ref u) => u.pretty_print(),
            Binary(ref b) => b.pretty_print(),
            Logic(ref l) => l.pretty_print(),
            Variable(ref var) => var.name.clone(),
            Assign(ref a) => a.pretty_print(),
            Call(ref call) => call.pretty_print(),
            Get(ref get) => get.pretty_print(),
            Set(ref set) => set.pretty_print(),
            This(_) => "this".to_string(),
            Super(ref sup) => format!("(super {})", sup.name),
        }
    }
}

/// Implemented to operators
trait PrettyPrintHelper {
    fn pretty_print_help(&self) -> &str;
}

impl PrettyPrintHelper for UnaryOper {
    fn pretty_print_help(&self) -> &str {
        use UnaryOper::*;
        match *self {
            Not => "!",
            Minus => "-",
        }
    }
}

impl PrettyPrintHelper for BinaryOper {
    fn pretty_print_help(&self) -> &str {
        use BinaryOper::*;
        match *self {
            Minus => "-",
            Plus => "+",
            Mul => "*",
            Div => "/",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
        }
    }
}

impl PrettyPrintHelper for LogicOper {
    fn pretty_print_help(&self) -> &str {
        use LogicOper::*;
        match *self {
            Or => "or",
            And => "and",
        }
    }
}

impl PrettyPrint for LiteralData {
    fn pretty_print(&self) -> String {
        use LiteralData::*;
        match *self {
            Nil => "nil".into(),
            Bool(b) => b.to_string(),
            StringLit(ref s) => format!("\"{}\"", s),
            Number(n) => n.to_string(),
        }
    }
}

impl PrettyPrint for UnaryData {
    fn pretty_print(&self) -> String {
        format!(
            "({} {})",
            self.oper.pretty_print_help(),
            self.expr.pretty_print()
        )
    }
}

impl PrettyPrint for BinaryData {
    fn pretty_print(&self) -> String {
        format!(
            "({} {} {})",
            self.oper.pretty_print_help(),
            self.left.pretty_print(),
            self.right.pretty_print()
        )
    }
}

impl PrettyPrint for LogicData {
    fn pretty_print(&self) -> String {
        format!(
            "({} {} {})",
            self.oper.pretty_print_help(),
            self.left.pretty_print(),
            self.right.pretty_print()
        )
    }
}

impl PrettyPrint for AssignData {
    fn pretty_print(&self) -> String {
        format!(
            "(assign \"{}\" {})",
            self.assigned.name,
            self.expr.pretty_print()
        )
    }
}

impl PrettyPrint for CallData {
    fn pretty_print(&self) -> String {
        format!(
            "({} {})",
            self.callee.pretty_print(),
            self::pretty_vec(self.args.iter().map(|expr| expr.pretty_print()))
        )
    }
}

impl PrettyPrint for GetUseData {
    fn pretty_print(&self) -> String {
        format!("(get {} {})", self.name, self.body.pretty_print())
    }
}

impl PrettyPrint for SetUseData {
    fn pretty_print(&self) -> String {
        format!(
            "(set {} {} {})",
            self.body.pretty_print(),
            self.name,
            self.value.pretty_print(),
        )
    }
}

/// Tests expression printing
#[cfg(test)]
mod test {
    use crate::ast::{expr::*, pretty_printer::PrettyPrint, stmt::*};

    /// Tests this: (* (- 123) 45.67)
    #[test]
    fn print_nested_expr() {
        let expr = Expr::binary(
            Expr::unary(UnaryOper::Minus, Expr::literal(123.0.into())),
            BinaryOper::Mul,
            Expr::literal(45.67.into()),
        );
        assert_eq!(expr.pretty_print(), "(* (- 123) 45.67)");
    }

    #[test]
    fn print_class_decl() {
        let class = Stmt::class_decl(
            "B",
            vec![FnDeclArgs::new(
                "greet",
                &[],
                BlockArgs::new(vec![Stmt::expr(Expr::call(
                    Expr::super_("greet"),
                    vec![],
                ))]),
            )],
            Some("A"),
        );
        let printed = class.pretty_print();
        assert!(printed.starts_with("(class B < A"));
        assert!(printed.contains("(defn greet ()"));
        assert!(printed.contains("((super greet) ())"));
    }
}
