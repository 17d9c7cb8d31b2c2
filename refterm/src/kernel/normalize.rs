//! Beta reduction and constant folding.

use super::{Ctx, Expr, ExprKind, Ty, TyKind, TypeFoldable, TypeFolder};
use crate::{BinOp, UnOp};

/// Maximal number of beta reductions per normalisation.
const FUEL: usize = 4096;
/// Maximal nesting of beta reductions.
const MAX_DEPTH: usize = 32;

pub(crate) struct Normalizer<'a> {
    cx: &'a mut Ctx,
    fuel: usize,
    depth: usize,
}

impl<'a> Normalizer<'a> {
    pub(crate) fn new(cx: &'a mut Ctx) -> Self {
        Self {
            cx,
            fuel: FUEL,
            depth: 0,
        }
    }
}

impl Normalizer<'_> {
    /// Reduce an application of an abstraction, if fuel and depth permit.
    fn beta(&mut self, func: &Expr, args: &[Expr]) -> Option<Expr> {
        let ExprKind::Abs(body) = func.kind() else { return None };
        if body.vars().len() != args.len() {
            return None;
        }
        if self.fuel == 0 || self.depth >= MAX_DEPTH {
            debug!("normalize: beta reduction limit reached");
            return None;
        }
        let body = body.instantiate(self.cx, args).ok()?;
        self.fuel -= 1;
        self.depth += 1;
        let e = body.fold_with(self);
        self.depth -= 1;
        Some(e)
    }

    /// Simplify an expression whose children are normal.
    fn simplify(&mut self, e: &Expr) -> Option<Expr> {
        match e.kind() {
            ExprKind::TupleProj(t, field) => match t.kind() {
                ExprKind::Tuple(es) => es.get(*field as usize).cloned(),
                _ => None,
            },
            ExprKind::App(func, args) => self.beta(func, args),
            ExprKind::BinaryOp(op, e1, e2) => self.binary(*op, e1, e2),
            ExprKind::UnaryOp(op, e) => match (op, e.kind()) {
                (_, ExprKind::Constant(c)) => Some(self.cx.constant(c.eval_unary(*op)?)),
                (UnOp::Not, ExprKind::UnaryOp(UnOp::Not, e)) => Some(e.clone()),
                (UnOp::Neg, ExprKind::UnaryOp(UnOp::Neg, e)) => Some(e.clone()),
                _ => None,
            },
            ExprKind::IfThenElse(c, e1, e2) => match c.as_bool() {
                Some(true) => Some(e1.clone()),
                Some(false) => Some(e2.clone()),
                None if e1 == e2 => Some(e1.clone()),
                None => None,
            },
            _ => None,
        }
    }

    fn binary(&mut self, op: BinOp, e1: &Expr, e2: &Expr) -> Option<Expr> {
        if let (Some(c1), Some(c2)) = (e1.as_constant(), e2.as_constant()) {
            return Some(self.cx.constant(c1.eval_binary(op, c2)?));
        }
        let (b1, b2) = (e1.as_bool(), e2.as_bool());
        match op {
            BinOp::And => match (b1, b2) {
                (Some(true), _) => Some(e2.clone()),
                (_, Some(true)) => Some(e1.clone()),
                (Some(false), _) | (_, Some(false)) => Some(self.cx.ff()),
                _ => None,
            },
            BinOp::Or => match (b1, b2) {
                (Some(false), _) => Some(e2.clone()),
                (_, Some(false)) => Some(e1.clone()),
                (Some(true), _) | (_, Some(true)) => Some(self.cx.tt()),
                _ => None,
            },
            BinOp::Imp => match (b1, b2) {
                (Some(true), _) => Some(e2.clone()),
                (Some(false), _) | (_, Some(true)) => Some(self.cx.tt()),
                _ => None,
            },
            BinOp::Iff => match (b1, b2) {
                (Some(true), _) => Some(e2.clone()),
                (_, Some(true)) => Some(e1.clone()),
                _ if e1.ptr_eq(e2) => Some(self.cx.tt()),
                _ => None,
            },
            BinOp::Eq | BinOp::Le | BinOp::Ge if e1.ptr_eq(e2) => Some(self.cx.tt()),
            BinOp::Ne | BinOp::Lt | BinOp::Gt if e1.ptr_eq(e2) => Some(self.cx.ff()),
            _ => None,
        }
    }
}

impl TypeFolder for Normalizer<'_> {
    fn cx(&mut self) -> &mut Ctx {
        self.cx
    }

    fn fold_expr(&mut self, e: &Expr) -> Expr {
        let e = e.super_fold_with(self);
        match self.simplify(&e) {
            Some(e2) => {
                trace!("normalize: {} ⟶ {}", e, e2);
                e2
            }
            None => e,
        }
    }

    fn fold_ty(&mut self, ty: &Ty) -> Ty {
        let ty = ty.super_fold_with(self);
        if let TyKind::Constr(pred, inner) = ty.kind() {
            if pred.is_true() {
                return inner.clone();
            }
        }
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Scope, Sort};
    use super::*;
    use alloc::string::{String, ToString};

    fn scope() -> Scope {
        let mut scope = Scope::new();
        scope.declare("n", Sort::Int).unwrap();
        scope.declare("p", Sort::Bool).unwrap();
        scope
    }

    fn normalize(s: &str) -> String {
        let mut cx = Ctx::new();
        let e = scope().expr(&mut cx, s).unwrap();
        e.normalize(&mut cx).to_string()
    }

    #[test]
    fn beta() {
        assert_eq!(normalize("(|x: int, y: int| x * y + 1)(2, 3)"), "7");
        assert_eq!(normalize("(|f: fn(int) -> int| f(n))(|x: int| x + 1)"), "(a0 + 1)");
        assert_eq!(normalize("(|x: int| x)(1, 2)"), "(λint. β0.0)(1, 2)");
        let nested = "|y: int| (|x: int| x + y)(y)";
        assert_eq!(normalize(nested), "(λint. (β0.0 + β0.0))");
    }

    #[test]
    fn tuples() {
        assert_eq!(normalize("(1, n).1"), "a0");
        assert_eq!(normalize("((n, p), 2).0.1"), "a1");
        assert_eq!(normalize("(1, n).2"), "(1, a0).2");
    }

    #[test]
    fn constants() {
        assert_eq!(normalize("1 + 2 * 3 >= 7"), "true");
        assert_eq!(normalize("-(0 - 5) % 3"), "2");
        assert_eq!(normalize("n / 0"), "(a0 / 0)");
        assert_eq!(normalize("1 / 0"), "(1 / 0)");
        assert_eq!(normalize("if 1 < 2 { n } else { 0 }"), "a0");
        assert_eq!(normalize("if p { n } else { n }"), "a0");
    }

    #[test]
    fn booleans() {
        assert_eq!(normalize("true && p"), "a1");
        assert_eq!(normalize("p || false"), "a1");
        assert_eq!(normalize("p && false"), "false");
        assert_eq!(normalize("false => p"), "true");
        assert_eq!(normalize("!!p"), "a1");
        assert_eq!(normalize("n == n"), "true");
        assert_eq!(normalize("n < n"), "false");
        assert_eq!(normalize("p <=> p"), "true");
        assert_eq!(normalize("n == 1"), "(a0 == 1)");
    }

    #[test]
    fn types() {
        let mut cx = Ctx::new();
        let scope = scope();
        let ty = scope.ty(&mut cx, "{v: int. {i32[v] | 0 < 1}}").unwrap();
        let expected = scope.ty(&mut cx, "i32").unwrap();
        assert_eq!(ty.normalize(&mut cx), expected);

        let ty = scope.ty(&mut cx, "{i32[n] | (|x: int| x > 0)(n)}").unwrap();
        assert_eq!(ty.normalize(&mut cx).to_string(), "{i32[a0] | (a0 > 0)}");
    }

    #[test]
    fn self_application_terminates() {
        let mut cx = Ctx::new();
        let e = scope().expr(&mut cx, "(|f: int| f(f))(|f: int| f(f))").unwrap();
        // the term reduces to itself until the reduction limit is reached
        assert!(e.normalize(&mut cx).ptr_eq(&e));

        let s = "(|x: int| x + 1)((|f: int| f(f))(|f: int| f(f)))";
        let e = scope().expr(&mut cx, s).unwrap();
        let omega = "((λint. β0.0(β0.0))((λint. β0.0(β0.0))) + 1)";
        assert_eq!(e.normalize(&mut cx).to_string(), omega);
    }

    #[test]
    fn normal_forms_are_shared() {
        let mut cx = Ctx::new();
        let e = scope().expr(&mut cx, "n + 1 > 0 && p").unwrap();
        assert!(e.normalize(&mut cx).ptr_eq(&e));
    }
}
