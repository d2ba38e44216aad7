//! Sonar-style cognitive complexity.
//!
//! Each control structure (`if`/`elif`/`for`/`while`/`try`/`except`/
//! `finally`/`with`) adds one plus the current nesting depth; boolean
//! operator chains add `len(values) - 1`, flat, with no nesting
//! interaction — except directly in an `if`/`elif` test, where the chain
//! itself earns no bonus (only one nested deeper, e.g. as a call
//! argument, does), matching the reference visitor's `generic_visit`
//! over the test node rather than a dispatched visit; every `return`
//! adds one. The walk covers the whole file (nested function and class
//! bodies included), so the result is a single per-file figure, not a
//! per-function one.

use rustpython_parser::ast;

use crate::core::config::ComplexityScale;
use crate::core::model::SourceFile;

/// Cognitive-complexity outcome for one file.
#[derive(Debug, Clone, Copy)]
pub struct ComplexityOutcome {
    pub raw: u32,
    pub per_loc: f64,
    pub score: f64,
}

/// Score every source file's cognitive complexity independently.
pub fn analyze(files: &[SourceFile], scale: &ComplexityScale) -> Vec<(String, ComplexityOutcome)> {
    files
        .iter()
        .map(|f| (f.path.clone(), analyze_one(f, scale)))
        .collect()
}

fn analyze_one(file: &SourceFile, scale: &ComplexityScale) -> ComplexityOutcome {
    let outcome = crate::core::ast_service::parse(&file.source);
    let module = match (outcome.module, outcome.success) {
        (Some(module), true) => module,
        _ => {
            return ComplexityOutcome {
                raw: 0,
                per_loc: 0.0,
                score: 100.0,
            }
        }
    };

    let mut walker = Walker { complexity: 0, depth: 0 };
    for stmt in &module.body {
        walker.visit_stmt(stmt);
    }
    let raw = walker.complexity;

    let loc = file.loc.max(1) as f64;
    let per_loc = raw as f64 / loc;
    let hard_cap = scale.hard_cap as f64;
    let score = if raw as f64 >= hard_cap {
        0.0
    } else {
        let ratio = (per_loc / scale.target_per_loc.max(1e-6)).min(1.0);
        (100.0 * (1.0 - ratio)).max(0.0)
    };

    ComplexityOutcome { raw, per_loc, score }
}

/// A nesting-depth-aware walker. `depth` is the number of currently-open
/// control-structure frames (if/for/while/try/with/except/finally),
/// mirroring the original's explicit frame stack.
struct Walker {
    complexity: u32,
    depth: u32,
}

impl Walker {
    fn enter(&mut self) {
        self.complexity += 1 + self.depth;
        self.depth += 1;
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn visit_stmt(&mut self, stmt: &ast::Stmt) {
        use ast::Stmt::*;
        match stmt {
            If(s) => self.visit_if(s),
            For(s) => {
                self.enter();
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                for c in &s.body {
                    self.visit_stmt(c);
                }
                for c in &s.orelse {
                    self.visit_stmt(c);
                }
                self.leave();
            }
            AsyncFor(s) => {
                self.enter();
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                for c in &s.body {
                    self.visit_stmt(c);
                }
                for c in &s.orelse {
                    self.visit_stmt(c);
                }
                self.leave();
            }
            While(s) => {
                self.enter();
                self.visit_expr(&s.test);
                for c in &s.body {
                    self.visit_stmt(c);
                }
                for c in &s.orelse {
                    self.visit_stmt(c);
                }
                self.leave();
            }
            With(s) => {
                self.enter();
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                }
                for c in &s.body {
                    self.visit_stmt(c);
                }
                self.leave();
            }
            AsyncWith(s) => {
                self.enter();
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                }
                for c in &s.body {
                    self.visit_stmt(c);
                }
                self.leave();
            }
            Try(s) => self.visit_try(&s.body, &s.handlers, &s.orelse, &s.finalbody),
            TryStar(s) => self.visit_try(&s.body, &s.handlers, &s.orelse, &s.finalbody),
            Return(s) => {
                self.complexity += 1;
                if let Some(v) = &s.value {
                    self.visit_expr(v);
                }
            }
            FunctionDef(s) => {
                for c in &s.body {
                    self.visit_stmt(c);
                }
            }
            AsyncFunctionDef(s) => {
                for c in &s.body {
                    self.visit_stmt(c);
                }
            }
            ClassDef(s) => {
                for c in &s.body {
                    self.visit_stmt(c);
                }
            }
            Assign(s) => {
                for t in &s.targets {
                    self.visit_expr(t);
                }
                self.visit_expr(&s.value);
            }
            AugAssign(s) => {
                self.visit_expr(&s.target);
                self.visit_expr(&s.value);
            }
            AnnAssign(s) => {
                self.visit_expr(&s.target);
                if let Some(v) = &s.value {
                    self.visit_expr(v);
                }
            }
            Expr(s) => self.visit_expr(&s.value),
            Delete(s) => {
                for t in &s.targets {
                    self.visit_expr(t);
                }
            }
            Assert(s) => self.visit_expr(&s.test),
            Raise(s) => {
                if let Some(e) = &s.exc {
                    self.visit_expr(e);
                }
            }
            Match(s) => {
                self.visit_expr(&s.subject);
                for case in &s.cases {
                    for c in &case.body {
                        self.visit_stmt(c);
                    }
                }
            }
            _ => {}
        }
    }

    /// `if`: the `test` expression is walked through its *children* only —
    /// a boolean-operator chain directly in the condition earns no bonus at
    /// that position, only one nested deeper (e.g. as a call argument)
    /// does. This mirrors the reference visitor's `generic_visit(node.test)`
    /// exactly, rather than dispatching its own `visit`. Each `elif` is
    /// itself reached through this same recursive path, so its test gets
    /// identical treatment — its own nesting frame, its own children-only
    /// test walk — before the parent's own body/`orelse` are visited.
    fn visit_if(&mut self, s: &ast::StmtIf) {
        self.enter();
        for item in &s.orelse {
            if let ast::Stmt::If(elif) = item {
                self.enter();
                self.visit_expr_children_only(&elif.test);
                for c in &elif.body {
                    self.visit_stmt(c);
                }
                for c in &elif.orelse {
                    self.visit_stmt(c);
                }
                self.leave();
            }
        }
        self.visit_expr_children_only(&s.test);
        for c in &s.body {
            self.visit_stmt(c);
        }
        for c in &s.orelse {
            if !matches!(c, ast::Stmt::If(_)) {
                self.visit_stmt(c);
            }
        }
        self.leave();
    }

    /// Visit `expr`'s children without dispatching on `expr` itself, so a
    /// boolean-operator chain directly at this position earns no bonus —
    /// only one nested inside one of these children would, via the
    /// ordinary recursive `visit_expr` call on that child.
    fn visit_expr_children_only(&mut self, expr: &ast::Expr) {
        use ast::Expr::*;
        match expr {
            BoolOp(e) => {
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            NamedExpr(e) => {
                self.visit_expr(&e.target);
                self.visit_expr(&e.value);
            }
            BinOp(e) => {
                self.visit_expr(&e.left);
                self.visit_expr(&e.right);
            }
            UnaryOp(e) => self.visit_expr(&e.operand),
            Compare(e) => {
                self.visit_expr(&e.left);
                for c in &e.comparators {
                    self.visit_expr(c);
                }
            }
            Call(e) => {
                self.visit_expr(&e.func);
                for a in &e.args {
                    self.visit_expr(a);
                }
            }
            Attribute(e) => self.visit_expr(&e.value),
            _ => {}
        }
    }

    fn visit_try(
        &mut self,
        body: &[ast::Stmt],
        handlers: &[ast::ExceptHandler],
        orelse: &[ast::Stmt],
        finalbody: &[ast::Stmt],
    ) {
        self.enter();
        for handler in handlers {
            let ast::ExceptHandler::ExceptHandler(h) = handler;
            self.enter();
            for c in &h.body {
                self.visit_stmt(c);
            }
            self.leave();
        }
        if !finalbody.is_empty() {
            self.enter();
            for c in finalbody {
                self.visit_stmt(c);
            }
            self.leave();
        }
        for c in body {
            self.visit_stmt(c);
        }
        for c in orelse {
            self.visit_stmt(c);
        }
        self.leave();
    }

    fn visit_expr(&mut self, expr: &ast::Expr) {
        use ast::Expr::*;
        match expr {
            BoolOp(e) => {
                self.complexity += (e.values.len() as u32).saturating_sub(1);
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            NamedExpr(e) => {
                self.visit_expr(&e.target);
                self.visit_expr(&e.value);
            }
            BinOp(e) => {
                self.visit_expr(&e.left);
                self.visit_expr(&e.right);
            }
            UnaryOp(e) => self.visit_expr(&e.operand),
            Lambda(e) => self.visit_expr(&e.body),
            IfExp(e) => {
                self.visit_expr(&e.test);
                self.visit_expr(&e.body);
                self.visit_expr(&e.orelse);
            }
            Dict(e) => {
                for k in e.keys.iter().flatten() {
                    self.visit_expr(k);
                }
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            Set(e) => {
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            ListComp(e) => self.visit_expr(&e.elt),
            SetComp(e) => self.visit_expr(&e.elt),
            DictComp(e) => {
                self.visit_expr(&e.key);
                self.visit_expr(&e.value);
            }
            GeneratorExp(e) => self.visit_expr(&e.elt),
            Await(e) => self.visit_expr(&e.value),
            Yield(e) => {
                if let Some(v) = &e.value {
                    self.visit_expr(v);
                }
            }
            YieldFrom(e) => self.visit_expr(&e.value),
            Compare(e) => {
                self.visit_expr(&e.left);
                for c in &e.comparators {
                    self.visit_expr(c);
                }
            }
            Call(e) => {
                self.visit_expr(&e.func);
                for a in &e.args {
                    self.visit_expr(a);
                }
            }
            FormattedValue(e) => self.visit_expr(&e.value),
            JoinedStr(e) => {
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            Attribute(e) => self.visit_expr(&e.value),
            Subscript(e) => {
                self.visit_expr(&e.value);
                self.visit_expr(&e.slice);
            }
            Starred(e) => self.visit_expr(&e.value),
            List(e) => {
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            Tuple(e) => {
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            Slice(e) => {
                if let Some(l) = &e.lower {
                    self.visit_expr(l);
                }
                if let Some(u) = &e.upper {
                    self.visit_expr(u);
                }
            }
            Constant(_) | Name(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ComplexityScale;

    fn scale() -> ComplexityScale {
        ComplexityScale { target_per_loc: 0.25, hard_cap: 50 }
    }

    fn raw_of(source: &str) -> u32 {
        let file = SourceFile::new("f.py", source);
        analyze_one(&file, &scale()).raw
    }

    #[test]
    fn flat_if_adds_one() {
        assert_eq!(raw_of("if x:\n    pass\n"), 1);
    }

    #[test]
    fn nested_if_adds_depth_penalty() {
        // outer if (+1, depth 0->1), inner if (+1+1=2, depth 1->2) = 3
        assert_eq!(raw_of("if x:\n    if y:\n        pass\n"), 3);
    }

    #[test]
    fn elif_gets_its_own_frame_not_extra_nesting() {
        // if (+1), elif frame entered at depth 1 (+1+1=2) = 3
        assert_eq!(raw_of("if x:\n    pass\nelif y:\n    pass\n"), 3);
    }

    #[test]
    fn boolop_directly_in_an_if_test_earns_no_bonus() {
        // Pins the reference quirk: the test is walked through its
        // children only, so a BoolOp directly at that position is never
        // dispatched through `visit_expr` and earns no flat bonus.
        assert_eq!(raw_of("if a and b and c:\n    pass\n"), 1);
        assert_eq!(raw_of("if a and b:\n    pass\n"), 1);
    }

    #[test]
    fn boolop_directly_in_an_elif_test_also_earns_no_bonus() {
        // elif is reached through the same recursive path as the outer
        // `if`, so its test gets identical children-only treatment:
        // elif frame (+1+1=2), no bonus for its own direct BoolOp.
        assert_eq!(raw_of("if x:\n    pass\nelif a and b:\n    pass\n"), 1 + 2);
    }

    #[test]
    fn boolop_nested_inside_an_if_test_still_earns_its_bonus() {
        // The outer `or` sits directly in the test (no bonus), but its
        // left operand is itself a nested BoolOp, reached through the
        // ordinary recursive `visit_expr` call on a child, so *that* one
        // bonuses normally: if (+1) + nested `and` bonus (+1) = 2.
        assert_eq!(raw_of("if (a and b) or c:\n    pass\n"), 1 + 1);
    }

    #[test]
    fn boolop_as_a_call_argument_in_an_if_test_earns_its_bonus() {
        assert_eq!(raw_of("if f(a and b):\n    pass\n"), 1 + 1);
    }

    #[test]
    fn every_return_adds_one() {
        assert_eq!(raw_of("def f():\n    return 1\n\ndef g():\n    return 2\n"), 2);
    }

    #[test]
    fn unparsable_file_is_neutral() {
        let file = SourceFile::new("bad.py", "def f(:\n");
        let out = analyze_one(&file, &scale());
        assert_eq!(out.raw, 0);
        assert_eq!(out.score, 100.0);
    }

    #[test]
    fn hard_cap_zeroes_score() {
        let mut scale = scale();
        scale.hard_cap = 1;
        let file = SourceFile::new("f.py", "if x:\n    if y:\n        pass\n");
        let out = analyze_one(&file, &scale);
        assert_eq!(out.score, 0.0);
    }
}
