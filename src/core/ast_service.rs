//! Python AST services shared by every detector: parsing, import
//! extraction, annotation-coverage counting, and duplication-normalized
//! token streams.
//!
//! Every detector that needs structure rather than raw text goes through
//! here rather than re-parsing; a file is parsed exactly once per scan.

use rustpython_parser::ast;

/// The result of attempting to parse one source file.
pub struct ParseOutcome {
    pub module: Option<ast::ModModule>,
    pub success: bool,
}

/// Parse Python source, matching `ast.parse`'s all-or-nothing behavior: a
/// syntax error yields `success = false` rather than a partial tree.
pub fn parse(source: &str) -> ParseOutcome {
    match rustpython_parser::parse(source, rustpython_parser::Mode::Module, "<module>") {
        Ok(ast::Mod::Module(module)) => ParseOutcome {
            module: Some(module),
            success: true,
        },
        _ => ParseOutcome { module: None, success: false },
    }
}

/// Walk every descendant statement of `stmts` in deterministic pre-order,
/// calling `f` on each.
fn walk_stmts<'a>(stmts: &'a [ast::Stmt], f: &mut impl FnMut(&'a ast::Stmt)) {
    for stmt in stmts {
        f(stmt);
        for child in stmt_child_bodies(stmt) {
            walk_stmts(child, f);
        }
    }
}

/// The statement-list fields a given statement owns, in source order.
/// Mirrors the traversal `ast.walk` performs over compound statements.
fn stmt_child_bodies(stmt: &ast::Stmt) -> Vec<&[ast::Stmt]> {
    use ast::Stmt::*;
    match stmt {
        FunctionDef(s) => vec![&s.body[..]],
        AsyncFunctionDef(s) => vec![&s.body[..]],
        ClassDef(s) => vec![&s.body[..]],
        If(s) => vec![&s.body[..], &s.orelse[..]],
        For(s) => vec![&s.body[..], &s.orelse[..]],
        AsyncFor(s) => vec![&s.body[..], &s.orelse[..]],
        While(s) => vec![&s.body[..], &s.orelse[..]],
        With(s) => vec![&s.body[..]],
        AsyncWith(s) => vec![&s.body[..]],
        Try(s) => {
            let mut out = vec![&s.body[..], &s.orelse[..], &s.finalbody[..]];
            for handler in &s.handlers {
                let ast::ExceptHandler::ExceptHandler(h) = handler;
                out.push(&h.body[..]);
            }
            out
        }
        TryStar(s) => {
            let mut out = vec![&s.body[..], &s.orelse[..], &s.finalbody[..]];
            for handler in &s.handlers {
                let ast::ExceptHandler::ExceptHandler(h) = handler;
                out.push(&h.body[..]);
            }
            out
        }
        Match(s) => s.cases.iter().map(|case| &case.body[..]).collect(),
        _ => Vec::new(),
    }
}

/// Every `(full_name, root)` pair imported anywhere in the module,
/// `import a.b.c` yielding `("a.b.c", "a")` and `from a.b import c`
/// yielding `("a.b", "a")`.
pub fn iter_imports(module: &ast::ModModule) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut collect = |stmt: &ast::Stmt| match stmt {
        ast::Stmt::Import(import) => {
            for alias in &import.names {
                let name = alias.name.to_string();
                let root = name.split('.').next().unwrap_or("").to_string();
                out.push((name, root));
            }
        }
        ast::Stmt::ImportFrom(import_from) => {
            let module_name = import_from
                .module
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_default();
            let root = module_name.split('.').next().unwrap_or("").to_string();
            out.push((module_name, root));
        }
        _ => {}
    };
    walk_stmts(&module.body, &mut collect);
    out
}

/// `(annotated, total)` annotation-site counts across every function and
/// async function in the module: the return annotation plus each
/// positional/keyword-only/`*args`/`**kwargs` parameter annotation.
pub fn count_annotation_coverage(module: &ast::ModModule) -> (u32, u32) {
    let mut annotated = 0u32;
    let mut total = 0u32;
    let mut visit_def = |args: &ast::Arguments, returns: &Option<Box<ast::Expr>>| {
        if returns.is_some() {
            annotated += 1;
        }
        total += 1;
        for arg in args.args.iter().chain(args.kwonlyargs.iter()) {
            total += 1;
            if arg.def.annotation.is_some() {
                annotated += 1;
            }
        }
        if let Some(vararg) = &args.vararg {
            total += 1;
            if vararg.annotation.is_some() {
                annotated += 1;
            }
        }
        if let Some(kwarg) = &args.kwarg {
            total += 1;
            if kwarg.annotation.is_some() {
                annotated += 1;
            }
        }
    };
    let mut collect = |stmt: &ast::Stmt| match stmt {
        ast::Stmt::FunctionDef(f) => visit_def(&f.args, &f.returns),
        ast::Stmt::AsyncFunctionDef(f) => visit_def(&f.args, &f.returns),
        _ => {}
    };
    walk_stmts(&module.body, &mut collect);
    (annotated, total)
}

/// Normalization behavior for [`normalize_for_dup`], mirroring
/// `DuplicationConfig::normalize`.
pub struct NormalizeOptions<'a> {
    pub strip_literals: bool,
    pub strip_comments: bool,
    pub identifier_placeholder: &'a str,
}

/// Produce the whitespace-separated token stream a file contributes to
/// winnowing: identifiers, attribute names, and literals are collapsed to
/// placeholders (when `strip_literals` is set and the file parses), and
/// `#`-comments are dropped from the non-AST fallback path (when
/// `strip_comments` is set).
///
/// The original normalizer walks the AST with a substituting transformer
/// and then re-serializes it to source text before tokenizing on
/// whitespace; lacking a Python unparser in this ecosystem, the
/// normalized token stream is instead emitted directly from a structural
/// AST walk that performs the same substitutions — a node-kind token per
/// node, with `Name`/`Attribute`/`Constant` replaced exactly as the
/// original transformer replaces them. Returns `(tokens, parser_success)`.
pub fn normalize_for_dup(source: &str, opts: &NormalizeOptions<'_>) -> (Vec<String>, bool) {
    let outcome = parse(source);
    let tokens = match (&outcome.module, outcome.success, opts.strip_literals) {
        (Some(module), true, true) => {
            let mut emitter = TokenEmitter {
                placeholder: opts.identifier_placeholder,
                tokens: Vec::new(),
            };
            for stmt in &module.body {
                emitter.visit_stmt(stmt);
            }
            emitter.tokens
        }
        _ => {
            let text = if opts.strip_comments {
                strip_comments(source)
            } else {
                source.to_string()
            };
            text.split_whitespace().map(str::to_string).collect()
        }
    };
    (tokens, outcome.success)
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .map(|line| match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emits a deterministic structural token stream for an AST, substituting
/// identifiers, attribute names, and constants with a shared placeholder.
struct TokenEmitter<'a> {
    placeholder: &'a str,
    tokens: Vec<String>,
}

impl<'a> TokenEmitter<'a> {
    fn push(&mut self, tok: &str) {
        self.tokens.push(tok.to_string());
    }

    fn visit_stmt(&mut self, stmt: &ast::Stmt) {
        use ast::Stmt::*;
        match stmt {
            FunctionDef(s) => {
                self.push("FunctionDef");
                self.push(self.placeholder);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            AsyncFunctionDef(s) => {
                self.push("AsyncFunctionDef");
                self.push(self.placeholder);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            ClassDef(s) => {
                self.push("ClassDef");
                self.push(self.placeholder);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            Return(s) => {
                self.push("Return");
                if let Some(v) = &s.value {
                    self.visit_expr(v);
                }
            }
            Delete(s) => {
                self.push("Delete");
                for t in &s.targets {
                    self.visit_expr(t);
                }
            }
            Assign(s) => {
                self.push("Assign");
                for t in &s.targets {
                    self.visit_expr(t);
                }
                self.visit_expr(&s.value);
            }
            AugAssign(s) => {
                self.push("AugAssign");
                self.visit_expr(&s.target);
                self.visit_expr(&s.value);
            }
            AnnAssign(s) => {
                self.push("AnnAssign");
                self.visit_expr(&s.target);
                if let Some(v) = &s.value {
                    self.visit_expr(v);
                }
            }
            For(s) => {
                self.push("For");
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
            }
            AsyncFor(s) => {
                self.push("AsyncFor");
                self.visit_expr(&s.target);
                self.visit_expr(&s.iter);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
            }
            While(s) => {
                self.push("While");
                self.visit_expr(&s.test);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
            }
            If(s) => {
                self.push("If");
                self.visit_expr(&s.test);
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
            }
            With(s) => {
                self.push("With");
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                }
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            AsyncWith(s) => {
                self.push("AsyncWith");
                for item in &s.items {
                    self.visit_expr(&item.context_expr);
                }
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
            }
            Raise(s) => {
                self.push("Raise");
                if let Some(e) = &s.exc {
                    self.visit_expr(e);
                }
            }
            Try(s) => {
                self.push("Try");
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    self.push("ExceptHandler");
                    for stmt in &h.body {
                        self.visit_stmt(stmt);
                    }
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.finalbody {
                    self.visit_stmt(stmt);
                }
            }
            TryStar(s) => {
                self.push("TryStar");
                for stmt in &s.body {
                    self.visit_stmt(stmt);
                }
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(h) = handler;
                    self.push("ExceptHandler");
                    for stmt in &h.body {
                        self.visit_stmt(stmt);
                    }
                }
                for stmt in &s.orelse {
                    self.visit_stmt(stmt);
                }
                for stmt in &s.finalbody {
                    self.visit_stmt(stmt);
                }
            }
            Assert(s) => {
                self.push("Assert");
                self.visit_expr(&s.test);
            }
            Import(s) => {
                self.push("Import");
                for _ in &s.names {
                    self.push(self.placeholder);
                }
            }
            ImportFrom(s) => {
                self.push("ImportFrom");
                self.push(self.placeholder);
            }
            Global(_) => self.push("Global"),
            Nonlocal(_) => self.push("Nonlocal"),
            Expr(s) => {
                self.push("Expr");
                self.visit_expr(&s.value);
            }
            Pass(_) => self.push("Pass"),
            Break(_) => self.push("Break"),
            Continue(_) => self.push("Continue"),
            Match(s) => {
                self.push("Match");
                self.visit_expr(&s.subject);
                for case in &s.cases {
                    for stmt in &case.body {
                        self.visit_stmt(stmt);
                    }
                }
            }
            #[allow(unreachable_patterns)]
            _ => self.push("Stmt"),
        }
    }

    fn visit_expr(&mut self, expr: &ast::Expr) {
        use ast::Expr::*;
        match expr {
            BoolOp(e) => {
                self.push("BoolOp");
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            NamedExpr(e) => {
                self.push("NamedExpr");
                self.visit_expr(&e.target);
                self.visit_expr(&e.value);
            }
            BinOp(e) => {
                self.push("BinOp");
                self.visit_expr(&e.left);
                self.visit_expr(&e.right);
            }
            UnaryOp(e) => {
                self.push("UnaryOp");
                self.visit_expr(&e.operand);
            }
            Lambda(e) => {
                self.push("Lambda");
                self.visit_expr(&e.body);
            }
            IfExp(e) => {
                self.push("IfExp");
                self.visit_expr(&e.test);
                self.visit_expr(&e.body);
                self.visit_expr(&e.orelse);
            }
            Dict(e) => {
                self.push("Dict");
                for k in e.keys.iter().flatten() {
                    self.visit_expr(k);
                }
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            Set(e) => {
                self.push("Set");
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            ListComp(e) => {
                self.push("ListComp");
                self.visit_expr(&e.elt);
            }
            SetComp(e) => {
                self.push("SetComp");
                self.visit_expr(&e.elt);
            }
            DictComp(e) => {
                self.push("DictComp");
                self.visit_expr(&e.key);
                self.visit_expr(&e.value);
            }
            GeneratorExp(e) => {
                self.push("GeneratorExp");
                self.visit_expr(&e.elt);
            }
            Await(e) => {
                self.push("Await");
                self.visit_expr(&e.value);
            }
            Yield(e) => {
                self.push("Yield");
                if let Some(v) = &e.value {
                    self.visit_expr(v);
                }
            }
            YieldFrom(e) => {
                self.push("YieldFrom");
                self.visit_expr(&e.value);
            }
            Compare(e) => {
                self.push("Compare");
                self.visit_expr(&e.left);
                for c in &e.comparators {
                    self.visit_expr(c);
                }
            }
            Call(e) => {
                self.push("Call");
                self.visit_expr(&e.func);
                for a in &e.args {
                    self.visit_expr(a);
                }
            }
            FormattedValue(e) => {
                self.push("FormattedValue");
                self.visit_expr(&e.value);
            }
            JoinedStr(e) => {
                self.push("JoinedStr");
                for v in &e.values {
                    self.visit_expr(v);
                }
            }
            Constant(_) => self.push("CONST"),
            Attribute(e) => {
                self.push("Attribute");
                self.visit_expr(&e.value);
                self.push(self.placeholder);
            }
            Subscript(e) => {
                self.push("Subscript");
                self.visit_expr(&e.value);
                self.visit_expr(&e.slice);
            }
            Starred(e) => {
                self.push("Starred");
                self.visit_expr(&e.value);
            }
            Name(_) => self.push(self.placeholder),
            List(e) => {
                self.push("List");
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            Tuple(e) => {
                self.push("Tuple");
                for v in &e.elts {
                    self.visit_expr(v);
                }
            }
            Slice(e) => {
                self.push("Slice");
                if let Some(l) = &e.lower {
                    self.visit_expr(l);
                }
                if let Some(u) = &e.upper {
                    self.visit_expr(u);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reports_syntax_errors() {
        let outcome = parse("def f(:\n");
        assert!(!outcome.success);
        assert!(outcome.module.is_none());
    }

    #[test]
    fn imports_are_walked_through_nested_scopes() {
        let outcome = parse("import os\n\ndef f():\n    from a.b import c\n");
        let module = outcome.module.unwrap();
        let imports = iter_imports(&module);
        assert_eq!(
            imports,
            vec![
                ("os".to_string(), "os".to_string()),
                ("a.b".to_string(), "a".to_string()),
            ]
        );
    }

    #[test]
    fn annotation_coverage_counts_params_and_returns() {
        let outcome = parse("def f(a: int, b) -> int:\n    return a\n");
        let module = outcome.module.unwrap();
        let (annotated, total) = count_annotation_coverage(&module);
        assert_eq!(total, 3); // return + 2 params
        assert_eq!(annotated, 2); // return + a
    }

    #[test]
    fn normalize_substitutes_identifiers_and_constants() {
        let opts = NormalizeOptions {
            strip_literals: true,
            strip_comments: true,
            identifier_placeholder: "ID",
        };
        let (tokens, success) = normalize_for_dup("x = 1\ny = 1\n", &opts);
        assert!(success);
        let (tokens2, _) = normalize_for_dup("a = 2\nb = 2\n", &opts);
        assert_eq!(tokens, tokens2);
    }

    #[test]
    fn normalize_falls_back_to_text_on_syntax_error() {
        let opts = NormalizeOptions {
            strip_literals: true,
            strip_comments: true,
            identifier_placeholder: "ID",
        };
        let (tokens, success) = normalize_for_dup("def f(:\n", &opts);
        assert!(!success);
        assert!(!tokens.is_empty());
    }
}
