//! Store of interned terms.

use super::{AdtDef, AdtDefData, BaseTy, Binder, Expr, ExprKind, InternStats, Interned, Interner};
use super::{KVar, List, Sort, Ty, TyKind};
use crate::{BinOp, BoundVar, Constant, EVar, KVid, Name, ParamTy, RefKind, UnOp};
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::Hash;

/// Store that interns terms.
///
/// All compound terms are constructed via a store.
/// Equal terms constructed via the same store share one allocation:
///
/// ~~~
/// # use refterm::{rc::Ctx, BinOp, Name};
/// let mut cx = Ctx::new();
/// let x = cx.fvar(Name::new(0));
/// let one = cx.int(1);
/// let e1 = cx.add(x.clone(), one.clone());
/// let e2 = cx.binary_op(BinOp::Add, x, one);
/// assert!(e1.ptr_eq(&e2));
/// assert_eq!(cx.stats().hits, 1);
/// ~~~
///
/// Furthermore, the store determines whether
/// operations on constants are folded on construction.
pub struct Ctx {
    exprs: Interner<ExprKind>,
    tys: Interner<TyKind>,
    adt_defs: Interner<AdtDefData>,
    expr_lists: Interner<[Expr]>,
    ty_lists: Interner<[Ty]>,
    sort_lists: Interner<[Sort]>,
    /// if true, `binary_op` and `unary_op` evaluate operations on constants
    pub normalize_on_construction: bool,
}

/// Values that are interned by a store.
pub trait Internable: Hash + Eq + Sized {
    fn interner(cx: &mut Ctx) -> &mut Interner<Self>;
}

/// Values whose slices are interned by a store.
pub trait SliceInternable: Hash + Eq + Sized {
    fn interner(cx: &mut Ctx) -> &mut Interner<[Self]>;
}

impl Default for Ctx {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl Ctx {
    /// Construct an empty store without normalisation on construction.
    ///
    /// ~~~
    /// # use refterm::rc::Ctx;
    /// let cx = Ctx::new();
    /// assert!(cx.normalize_on_construction == false);
    /// ~~~
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an empty store that can hold about `n` terms of each kind without reallocating.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            exprs: Interner::with_capacity(n),
            tys: Interner::with_capacity(n),
            adt_defs: Interner::with_capacity(n),
            expr_lists: Interner::with_capacity(n),
            ty_lists: Interner::with_capacity(n),
            sort_lists: Interner::with_capacity(n),
            normalize_on_construction: false,
        }
    }

    pub fn intern<T: Internable>(&mut self, x: T) -> Interned<T> {
        T::interner(self).intern(x)
    }

    pub fn mk_list<T, I>(&mut self, iter: I) -> List<T>
    where
        T: SliceInternable,
        I: IntoIterator<Item = T>,
    {
        T::interner(self).intern_slice(iter.into_iter().collect())
    }

    /// Return the sum of the counters of all interners.
    pub fn stats(&self) -> InternStats {
        self.exprs.stats()
            + self.tys.stats()
            + self.adt_defs.stats()
            + self.expr_lists.stats()
            + self.ty_lists.stats()
            + self.sort_lists.stats()
    }

    /// Remove all terms that are referenced only by the store.
    ///
    /// Return the number of removed terms.
    pub fn sweep(&mut self) -> usize {
        let mut total = 0;
        loop {
            // removing outer terms may leave inner terms unreferenced
            let removed = self.tys.sweep()
                + self.ty_lists.sweep()
                + self.exprs.sweep()
                + self.expr_lists.sweep()
                + self.adt_defs.sweep()
                + self.sort_lists.sweep();
            if removed == 0 {
                debug!("swept {} terms", total);
                return total;
            }
            total += removed;
        }
    }

    pub fn sorts(&mut self, sorts: impl IntoIterator<Item = Sort>) -> List<Sort> {
        self.mk_list(sorts)
    }

    pub fn tuple_sort(&mut self, sorts: impl IntoIterator<Item = Sort>) -> Sort {
        Sort::Tuple(self.sorts(sorts))
    }

    pub fn func_sort(&mut self, inputs: impl IntoIterator<Item = Sort>, output: Sort) -> Sort {
        let mut sorts: Vec<_> = inputs.into_iter().collect();
        sorts.push(output);
        Sort::Func(self.sorts(sorts))
    }

    pub fn mk_expr(&mut self, kind: ExprKind) -> Expr {
        trace!("intern expression {}", kind);
        self.exprs.intern(kind)
    }

    pub fn fvar(&mut self, name: Name) -> Expr {
        self.mk_expr(ExprKind::FreeVar(name))
    }

    pub fn bvar(&mut self, bvar: BoundVar) -> Expr {
        self.mk_expr(ExprKind::BoundVar(bvar))
    }

    /// Return the first variable of the innermost binder.
    pub fn nu(&mut self) -> Expr {
        self.bvar(BoundVar::NU)
    }

    pub fn evar(&mut self, evar: EVar) -> Expr {
        self.mk_expr(ExprKind::EVar(evar))
    }

    pub fn constant(&mut self, c: Constant) -> Expr {
        self.mk_expr(ExprKind::Constant(c))
    }

    pub fn int(&mut self, i: i128) -> Expr {
        self.constant(Constant::Int(i))
    }

    pub fn tt(&mut self) -> Expr {
        self.constant(Constant::TRUE)
    }

    pub fn ff(&mut self) -> Expr {
        self.constant(Constant::FALSE)
    }

    /// Construct a binary operation.
    ///
    /// ~~~
    /// # use refterm::{rc::Ctx, BinOp};
    /// let mut cx = Ctx::new();
    /// let (two, three) = (cx.int(2), cx.int(3));
    /// assert_eq!(cx.mul(two.clone(), three.clone()).to_string(), "(2 * 3)");
    ///
    /// cx.normalize_on_construction = true;
    /// assert_eq!(cx.mul(two, three), cx.int(6));
    /// ~~~
    pub fn binary_op(&mut self, op: BinOp, e1: Expr, e2: Expr) -> Expr {
        if self.normalize_on_construction {
            if let (Some(c1), Some(c2)) = (e1.as_constant(), e2.as_constant()) {
                if let Some(c) = c1.eval_binary(op, c2) {
                    return self.constant(c);
                }
            }
        }
        self.mk_expr(ExprKind::BinaryOp(op, e1, e2))
    }

    pub fn unary_op(&mut self, op: UnOp, e: Expr) -> Expr {
        if self.normalize_on_construction {
            if let Some(c) = e.as_constant().and_then(|c| c.eval_unary(op)) {
                return self.constant(c);
            }
        }
        self.mk_expr(ExprKind::UnaryOp(op, e))
    }

    pub fn eq(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Eq, e1, e2)
    }

    pub fn ne(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Ne, e1, e2)
    }

    pub fn lt(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Lt, e1, e2)
    }

    pub fn le(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Le, e1, e2)
    }

    pub fn gt(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Gt, e1, e2)
    }

    pub fn ge(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Ge, e1, e2)
    }

    pub fn add(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Add, e1, e2)
    }

    pub fn sub(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Sub, e1, e2)
    }

    pub fn mul(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Mul, e1, e2)
    }

    pub fn and(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::And, e1, e2)
    }

    pub fn or(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Or, e1, e2)
    }

    pub fn imp(&mut self, e1: Expr, e2: Expr) -> Expr {
        self.binary_op(BinOp::Imp, e1, e2)
    }

    pub fn not(&mut self, e: Expr) -> Expr {
        self.unary_op(UnOp::Not, e)
    }

    pub fn neg(&mut self, e: Expr) -> Expr {
        self.unary_op(UnOp::Neg, e)
    }

    /// Return the conjunction of the expressions, or `true` if there are none.
    ///
    /// ~~~
    /// # use refterm::{rc::Ctx, Name};
    /// let mut cx = Ctx::new();
    /// let ps: Vec<_> = (0..3).map(|n| cx.fvar(Name::new(n))).collect();
    /// assert_eq!(cx.and_all(ps.clone()).to_string(), "((a0 && a1) && a2)");
    /// assert_eq!(cx.or_all(ps[..1].to_vec()).to_string(), "a0");
    /// assert_eq!(cx.and_all([]), cx.tt());
    /// ~~~
    pub fn and_all(&mut self, es: impl IntoIterator<Item = Expr>) -> Expr {
        let mut es = es.into_iter();
        match es.next() {
            Some(first) => es.fold(first, |acc, e| self.and(acc, e)),
            None => self.tt(),
        }
    }

    /// Return the disjunction of the expressions, or `false` if there are none.
    pub fn or_all(&mut self, es: impl IntoIterator<Item = Expr>) -> Expr {
        let mut es = es.into_iter();
        match es.next() {
            Some(first) => es.fold(first, |acc, e| self.or(acc, e)),
            None => self.ff(),
        }
    }

    pub fn tuple(&mut self, es: impl IntoIterator<Item = Expr>) -> Expr {
        let es = self.mk_list(es);
        self.mk_expr(ExprKind::Tuple(es))
    }

    pub fn proj(&mut self, e: Expr, field: u32) -> Expr {
        self.mk_expr(ExprKind::TupleProj(e, field))
    }

    pub fn ite(&mut self, c: Expr, e1: Expr, e2: Expr) -> Expr {
        self.mk_expr(ExprKind::IfThenElse(c, e1, e2))
    }

    pub fn kvar(&mut self, kvid: KVid, args: impl IntoIterator<Item = Expr>) -> Expr {
        let args = self.mk_list(args);
        self.mk_expr(ExprKind::KVar(KVar { kvid, args }))
    }

    pub fn hole(&mut self) -> Expr {
        self.mk_expr(ExprKind::Hole)
    }

    pub fn abs(&mut self, body: Binder<Expr>) -> Expr {
        self.mk_expr(ExprKind::Abs(body))
    }

    pub fn app(&mut self, func: Expr, args: impl IntoIterator<Item = Expr>) -> Expr {
        let args = self.mk_list(args);
        self.mk_expr(ExprKind::App(func, args))
    }

    pub fn mk_ty(&mut self, kind: TyKind) -> Ty {
        trace!("intern type {}", kind);
        self.tys.intern(kind)
    }

    pub fn indexed(&mut self, bty: BaseTy, idx: Expr) -> Ty {
        self.mk_ty(TyKind::Indexed(bty, idx))
    }

    pub fn exists(&mut self, ty: Binder<Ty>) -> Ty {
        self.mk_ty(TyKind::Exists(ty))
    }

    /// Construct `{v: sort(bty). bty[v]}`, the type of all values of a base type.
    pub fn exists_base(&mut self, bty: BaseTy) -> Ty {
        let vars = self.sorts([bty.sort()]);
        let nu = self.nu();
        let ty = self.indexed(bty, nu);
        self.exists(Binder::new(ty, vars))
    }

    pub fn constr(&mut self, pred: Expr, ty: Ty) -> Ty {
        self.mk_ty(TyKind::Constr(pred, ty))
    }

    pub fn param(&mut self, param: ParamTy) -> Ty {
        self.mk_ty(TyKind::Param(param))
    }

    pub fn tuple_ty(&mut self, tys: impl IntoIterator<Item = Ty>) -> Ty {
        let tys = self.mk_list(tys);
        self.mk_ty(TyKind::Tuple(tys))
    }

    pub fn mk_ref(&mut self, rk: RefKind, ty: Ty) -> Ty {
        self.mk_ty(TyKind::Ref(rk, ty))
    }

    pub fn uninit(&mut self) -> Ty {
        self.mk_ty(TyKind::Uninit)
    }

    pub fn never(&mut self) -> Ty {
        self.mk_ty(TyKind::Never)
    }

    pub fn adt_def(&mut self, name: impl Into<String>, sort: Sort) -> AdtDef {
        let name = name.into();
        self.adt_defs.intern(AdtDefData { name, sort })
    }

    pub fn adt(&mut self, def: AdtDef, args: impl IntoIterator<Item = Ty>) -> BaseTy {
        BaseTy::Adt(def, self.mk_list(args))
    }
}

impl Internable for ExprKind {
    fn interner(cx: &mut Ctx) -> &mut Interner<Self> {
        &mut cx.exprs
    }
}

impl Internable for TyKind {
    fn interner(cx: &mut Ctx) -> &mut Interner<Self> {
        &mut cx.tys
    }
}

impl Internable for AdtDefData {
    fn interner(cx: &mut Ctx) -> &mut Interner<Self> {
        &mut cx.adt_defs
    }
}

impl SliceInternable for Expr {
    fn interner(cx: &mut Ctx) -> &mut Interner<[Self]> {
        &mut cx.expr_lists
    }
}

impl SliceInternable for Ty {
    fn interner(cx: &mut Ctx) -> &mut Interner<[Self]> {
        &mut cx.ty_lists
    }
}

impl SliceInternable for Sort {
    fn interner(cx: &mut Ctx) -> &mut Interner<[Self]> {
        &mut cx.sort_lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn lists() {
        let mut cx = Ctx::new();
        let s1 = cx.sorts([Sort::Int, Sort::Bool]);
        let s2 = cx.sorts(Vec::from([Sort::Int, Sort::Bool]));
        assert!(s1.ptr_eq(&s2));
        let empty1: List<Expr> = cx.mk_list([]);
        let empty2: List<Expr> = cx.mk_list(Vec::new());
        assert!(empty1.ptr_eq(&empty2));
        assert_eq!(cx.func_sort([Sort::Int], Sort::Bool).to_string(), "fn(int) -> bool");
    }

    #[test]
    fn sweep() {
        let mut cx = Ctx::new();
        let x = cx.fvar(Name::new(0));
        let y = cx.fvar(Name::new(1));
        let t = cx.tuple([x.clone(), y]);
        cx.indexed(BaseTy::Bool, t);
        // the type, the tuple, its list and `y`
        assert_eq!(cx.sweep(), 4);
        assert_eq!(cx.stats().values, 1);
        assert!(x.ptr_eq(&cx.fvar(Name::new(0))));
    }

    #[test]
    fn capacity() {
        let mut cx = Ctx::with_capacity(64);
        assert!(cx.exprs.capacity() >= 64);
        assert!(cx.adt_defs.capacity() >= 64);
        assert!(cx.sort_lists.capacity() >= 64);
        let d = cx.adt_def("Vec", Sort::Int);
        assert!(d.ptr_eq(&cx.adt_def("Vec", Sort::Int)));
        assert_eq!(cx.adt_defs.len(), 1);
    }

    #[test]
    fn adt_defs() {
        let mut cx = Ctx::new();
        let d1 = cx.adt_def("Vec", Sort::Int);
        let d2 = cx.adt_def(String::from("Vec"), Sort::Int);
        assert!(d1.ptr_eq(&d2));
        let int = cx.exists_base(BaseTy::Int(crate::IntTy::I32));
        let vec = cx.adt(d1, [int]);
        assert_eq!(vec.sort(), Sort::Int);
        assert_eq!(vec.to_string(), "Vec<{int. i32[β0.0]}>");
    }
}
