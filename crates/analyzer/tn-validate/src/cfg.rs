//! Shallow control-flow graph of a function body
//!
//! One node per top-level statement of the body, between an entry and an
//! exit node. Statements are chained in order and the chain stops at the
//! first `return`; nested blocks get no nodes of their own.

use tn_hir::{Body, Expr, ExprId, Stmt, StmtId};

/// Kind of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfgNodeKind {
    /// Function entry; always node 0
    Entry,
    /// Function exit
    Exit,
    /// `let`, assignment, `break` or `continue`
    Statement,
    /// Expression evaluated for effect
    Expression,
    /// `if`
    Branch,
    /// `while` or `for`
    Loop,
    /// Call evaluated for effect
    Call,
    /// `return`
    Return,
}

/// A graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgNode {
    /// Kind
    pub kind: CfgNodeKind,
    /// Statement the node stands for; `None` for entry and exit
    pub stmt: Option<StmtId>,
}

/// A directed edge, optionally guarded by a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgEdge {
    /// Source node
    pub from: usize,
    /// Target node
    pub to: usize,
    /// Guard of a branch or loop edge
    pub condition: Option<ExprId>,
}

/// Control-flow graph of one body
#[derive(Debug, Clone, Default)]
pub struct ControlFlowGraph {
    nodes: Vec<CfgNode>,
    edges: Vec<CfgEdge>,
}

impl ControlFlowGraph {
    /// Index of the entry node
    pub const ENTRY: usize = 0;

    /// Builds the graph of `body`'s top-level statements
    #[must_use]
    pub fn build(body: &Body) -> Self {
        let mut graph = Self::default();
        let entry = graph.add_node(CfgNodeKind::Entry, None);

        let mut tail = Some((entry, None));
        let mut returns = Vec::new();
        for &stmt_id in body.root_stmts() {
            let stmt = &body.stmts[stmt_id];
            let node = graph.add_node(node_kind(body, stmt), Some(stmt_id));
            // Nothing links past a `return`.
            let Some((from, condition)) = tail else {
                continue;
            };
            graph.add_edge(from, node, condition);
            tail = match stmt {
                Stmt::Return { .. } => {
                    returns.push(node);
                    None
                }
                Stmt::If { condition, .. } | Stmt::While { condition, .. } => {
                    Some((node, Some(*condition)))
                }
                Stmt::For { iterable, .. } => Some((node, Some(*iterable))),
                _ => Some((node, None)),
            };
        }

        let exit = graph.add_node(CfgNodeKind::Exit, None);
        for from in returns {
            graph.add_edge(from, exit, None);
        }
        if let Some((from, condition)) = tail {
            graph.add_edge(from, exit, condition);
        }
        graph
    }

    fn add_node(&mut self, kind: CfgNodeKind, stmt: Option<StmtId>) -> usize {
        self.nodes.push(CfgNode { kind, stmt });
        self.nodes.len() - 1
    }

    fn add_edge(&mut self, from: usize, to: usize, condition: Option<ExprId>) {
        self.edges.push(CfgEdge {
            from,
            to,
            condition,
        });
    }

    /// All nodes; index 0 is the entry
    #[must_use]
    pub fn nodes(&self) -> &[CfgNode] {
        &self.nodes
    }

    /// All edges in insertion order
    #[must_use]
    pub fn edges(&self) -> &[CfgEdge] {
        &self.edges
    }

    /// Index of the exit node
    #[must_use]
    pub fn exit(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Targets of the edges leaving `node`
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |edge| edge.from == node)
            .map(|edge| edge.to)
    }

    /// Reachability from the entry node, indexed by node
    #[must_use]
    pub fn reachable(&self) -> Vec<bool> {
        let mut seen = vec![false; self.nodes.len()];
        if self.nodes.is_empty() {
            return seen;
        }
        let mut stack = vec![Self::ENTRY];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut seen[node], true) {
                continue;
            }
            stack.extend(self.successors(node).filter(|next| !seen[*next]));
        }
        seen
    }

    /// Statements whose nodes cannot be reached from entry
    #[must_use]
    pub fn unreachable_statements(&self) -> Vec<StmtId> {
        self.reachable()
            .into_iter()
            .zip(&self.nodes)
            .filter(|(reached, _)| !reached)
            .filter_map(|(_, node)| node.stmt)
            .collect()
    }
}

fn node_kind(body: &Body, stmt: &Stmt) -> CfgNodeKind {
    match stmt {
        Stmt::Return { .. } => CfgNodeKind::Return,
        Stmt::If { .. } => CfgNodeKind::Branch,
        Stmt::While { .. } | Stmt::For { .. } => CfgNodeKind::Loop,
        Stmt::Expr { expr, .. } => match body.exprs[*expr] {
            Expr::Call { .. } => CfgNodeKind::Call,
            _ => CfgNodeKind::Expression,
        },
        Stmt::Let { .. } | Stmt::Assign { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {
            CfgNodeKind::Statement
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir_lower::lower_program;
    use tn_syntax::{AstBuilder, Block};

    fn graph_of(block: Block) -> (ControlFlowGraph, tn_hir::Function) {
        let b = AstBuilder::new();
        let program = b.program(vec![b.function("f", vec![], Some(b.named_ty("i32")), block)]);
        let (module, _) = lower_program(&program);
        let function = module.functions[0].clone();
        (ControlFlowGraph::build(&function.body), function)
    }

    #[test]
    fn test_sequential_chain() {
        let b = AstBuilder::new();
        let (graph, _) = graph_of(b.block(vec![
            b.let_stmt("x", Some(b.int(1))),
            b.expr_stmt(b.ident("x")),
            b.return_stmt(Some(b.ident("x"))),
        ]));
        let kinds: Vec<_> = graph.nodes().iter().map(|node| node.kind).collect();
        assert_eq!(
            kinds,
            [
                CfgNodeKind::Entry,
                CfgNodeKind::Statement,
                CfgNodeKind::Expression,
                CfgNodeKind::Return,
                CfgNodeKind::Exit,
            ]
        );
        assert_eq!(graph.edges().len(), 4);
        assert!(graph.unreachable_statements().is_empty());
        assert!(graph.reachable()[graph.exit()]);
    }

    #[test]
    fn test_statement_after_return_unreachable() {
        let b = AstBuilder::new();
        let (graph, function) = graph_of(b.block(vec![
            b.return_stmt(Some(b.int(0))),
            b.let_stmt("x", Some(b.int(1))),
        ]));
        assert_eq!(graph.unreachable_statements(), vec![function.body.root_stmts()[1]]);
    }

    #[test]
    fn test_branch_edge_carries_condition() {
        let b = AstBuilder::new();
        let (graph, function) = graph_of(b.block(vec![
            b.if_stmt(b.bool_lit(true), b.block(vec![b.return_stmt(Some(b.int(1)))]), None),
            b.return_stmt(Some(b.int(2))),
        ]));
        let Stmt::If { condition, .. } = &function.body.stmts[function.body.root_stmts()[0]] else {
            panic!("expected if");
        };
        assert_eq!(graph.nodes()[1].kind, CfgNodeKind::Branch);
        assert_eq!(graph.edges()[1].condition, Some(*condition));
        // Nested returns do not cut the top-level chain.
        assert!(graph.unreachable_statements().is_empty());
    }

    #[test]
    fn test_empty_body() {
        let (graph, _) = graph_of(AstBuilder::new().block(vec![]));
        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.successors(ControlFlowGraph::ENTRY).collect::<Vec<_>>(), [1]);
    }
}
