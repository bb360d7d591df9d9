//! Label resolution and loop/switch labeling.
//!
//! [`LabelResolver`] handles user labels: it uniquifies every `name:`
//! label (labels are function-scoped in C) and rewrites `goto` targets,
//! reporting duplicates and gotos to undefined labels.
//!
//! [`LoopLabeler`] mints a label for every loop and switch, annotates each
//! `break`/`continue` with its enclosing target, and collects the case
//! table of every switch. Minted prefixes are C keywords (`while.0`,
//! `switch.1`, `case.2`), so they can never collide with a uniquified user
//! label, which always starts with an identifier.

use crate::scope::NameGenerator;
use crate::SemanticError;
use indexmap::IndexMap;
use mcc_par::ast::{BlockItem, Expr, Function, Stmt};
use mcc_util::FxHashMap;

/// Uniquifies user labels and resolves `goto` targets against them.
pub struct LabelResolver {
    labels: FxHashMap<String, String>,
    names: NameGenerator,
    errors: Vec<SemanticError>,
}

impl LabelResolver {
    pub fn new() -> Self {
        Self {
            labels: FxHashMap::default(),
            names: NameGenerator::new(),
            errors: Vec::new(),
        }
    }

    /// Runs both walks: collect-and-rename labels, then rewrite gotos.
    pub fn run(mut self, function: &mut Function) -> Vec<SemanticError> {
        for item in &mut function.body {
            if let BlockItem::Statement(stmt) = item {
                self.collect(stmt);
            }
        }
        for item in &mut function.body {
            if let BlockItem::Statement(stmt) = item {
                self.rewrite_gotos(stmt);
            }
        }
        self.errors
    }

    fn collect(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Label { name, stmt } => {
                if self.labels.contains_key(name) {
                    self.errors.push(SemanticError::DuplicateLabel(name.clone()));
                } else {
                    // `.goto.` keeps the unique name out of every minted
                    // label namespace.
                    let unique = self.names.fresh(&format!("{}.goto", name));
                    self.labels.insert(name.clone(), unique.clone());
                    *name = unique;
                }
                self.collect(stmt);
            }
            Stmt::If {
                then_stmt,
                else_stmt,
                ..
            } => {
                self.collect(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.collect(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                for item in items {
                    if let BlockItem::Statement(stmt) = item {
                        self.collect(stmt);
                    }
                }
            }
            Stmt::While { body, .. }
            | Stmt::DoWhile { body, .. }
            | Stmt::For { body, .. }
            | Stmt::Switch { body, .. } => self.collect(body),
            Stmt::Case { stmt, .. } | Stmt::Default { stmt, .. } => self.collect(stmt),
            _ => {}
        }
    }

    fn rewrite_gotos(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Goto(target) => match self.labels.get(target) {
                Some(unique) => *target = unique.clone(),
                None => {
                    self.errors
                        .push(SemanticError::UndefinedLabel(target.clone()));
                }
            },
            Stmt::Label { stmt, .. } => self.rewrite_gotos(stmt),
            Stmt::If {
                then_stmt,
                else_stmt,
                ..
            } => {
                self.rewrite_gotos(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.rewrite_gotos(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                for item in items {
                    if let BlockItem::Statement(stmt) = item {
                        self.rewrite_gotos(stmt);
                    }
                }
            }
            Stmt::While { body, .. }
            | Stmt::DoWhile { body, .. }
            | Stmt::For { body, .. }
            | Stmt::Switch { body, .. } => self.rewrite_gotos(body),
            Stmt::Case { stmt, .. } | Stmt::Default { stmt, .. } => self.rewrite_gotos(stmt),
            _ => {}
        }
    }
}

/// What a `break` or `continue` may currently target.
enum Enclosing {
    Loop(String),
    Switch(String),
}

/// Per-switch state while its body is being walked.
struct SwitchFrame {
    /// Case value -> minted case label, in source order.
    cases: IndexMap<i32, String>,
    default_label: Option<String>,
}

/// Labels loops and switches, annotates break/continue, collects cases.
pub struct LoopLabeler {
    stack: Vec<Enclosing>,
    switches: Vec<SwitchFrame>,
    names: NameGenerator,
    errors: Vec<SemanticError>,
}

impl LoopLabeler {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            switches: Vec::new(),
            names: NameGenerator::new(),
            errors: Vec::new(),
        }
    }

    pub fn run(mut self, function: &mut Function) -> Vec<SemanticError> {
        for item in &mut function.body {
            if let BlockItem::Statement(stmt) = item {
                self.stmt(stmt);
            }
        }
        self.errors
    }

    fn loop_stmt(&mut self, prefix: &str, label_slot: &mut Option<String>, body: &mut Stmt) {
        let label = self.names.fresh(prefix);
        *label_slot = Some(label.clone());
        self.stack.push(Enclosing::Loop(label));
        self.stmt(body);
        self.stack.pop();
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::While { body, label, .. } => self.loop_stmt("while", label, body),
            Stmt::DoWhile { body, label, .. } => self.loop_stmt("do", label, body),
            Stmt::For { body, label, .. } => self.loop_stmt("for", label, body),
            Stmt::Switch {
                body,
                label,
                cases,
                default_label,
                ..
            } => {
                let switch_label = self.names.fresh("switch");
                *label = Some(switch_label.clone());
                self.stack.push(Enclosing::Switch(switch_label));
                self.switches.push(SwitchFrame {
                    cases: IndexMap::new(),
                    default_label: None,
                });
                self.stmt(body);
                let frame = self.switches.pop().expect("switch frame just pushed");
                self.stack.pop();
                *cases = frame.cases.into_iter().collect();
                *default_label = frame.default_label;
            }
            Stmt::Case { value, stmt, label } => {
                match self.switches.last_mut() {
                    None => self.errors.push(SemanticError::CaseOutsideSwitch),
                    Some(frame) => match constant_value(value) {
                        None => self.errors.push(SemanticError::NonConstantCase),
                        Some(v) => {
                            if frame.cases.contains_key(&v) {
                                self.errors.push(SemanticError::DuplicateCase(v));
                            } else {
                                let case_label = self.names.fresh("case");
                                frame.cases.insert(v, case_label.clone());
                                *label = Some(case_label);
                            }
                        }
                    },
                }
                self.stmt(stmt);
            }
            Stmt::Default { stmt, label } => {
                match self.switches.last_mut() {
                    None => self.errors.push(SemanticError::DefaultOutsideSwitch),
                    Some(frame) => {
                        if frame.default_label.is_some() {
                            self.errors.push(SemanticError::DuplicateDefault);
                        } else {
                            let default_label = self.names.fresh("default");
                            frame.default_label = Some(default_label.clone());
                            *label = Some(default_label);
                        }
                    }
                }
                self.stmt(stmt);
            }
            Stmt::Break { label } => match self.stack.last() {
                Some(Enclosing::Loop(l)) | Some(Enclosing::Switch(l)) => {
                    *label = Some(l.clone());
                }
                None => self.errors.push(SemanticError::BreakOutside),
            },
            Stmt::Continue { label } => {
                let target = self.stack.iter().rev().find_map(|e| match e {
                    Enclosing::Loop(l) => Some(l.clone()),
                    Enclosing::Switch(_) => None,
                });
                match target {
                    Some(l) => *label = Some(l),
                    None => self.errors.push(SemanticError::ContinueOutside),
                }
            }
            Stmt::If {
                then_stmt,
                else_stmt,
                ..
            } => {
                self.stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(else_stmt);
                }
            }
            Stmt::Compound(items) => {
                for item in items {
                    if let BlockItem::Statement(stmt) = item {
                        self.stmt(stmt);
                    }
                }
            }
            Stmt::Label { stmt, .. } => self.stmt(stmt),
            Stmt::Return(_) | Stmt::Expression(_) | Stmt::Null | Stmt::Goto(_) => {}
        }
    }
}

/// Extracts the value of an integer-constant case expression.
fn constant_value(expr: &Expr) -> Option<i32> {
    match expr {
        Expr::Constant(v) => Some(*v),
        _ => None,
    }
}
